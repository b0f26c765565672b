//! Counters for catalog cache activity.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Thread-safe counters, shared by every clone of a cache handle.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    /// Reads served from memory with no I/O
    pub memory_hits: Arc<AtomicU64>,
    /// Catalogs adopted from the durable snapshot
    pub durable_hydrations: Arc<AtomicU64>,
    /// Full catalog downloads started
    pub remote_fetches: Arc<AtomicU64>,
    /// Callers that joined a refresh already in flight
    pub coalesced_waits: Arc<AtomicU64>,
    /// Snapshot writes that failed
    pub persist_failures: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn record_memory_hit(&self) {
        self.memory_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_durable_hydration(&self) {
        self.durable_hydrations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_remote_fetch(&self) {
        self.remote_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced_wait(&self) {
        self.coalesced_waits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_persist_failure(&self) {
        self.persist_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            memory_hits: self.memory_hits.load(Ordering::Relaxed),
            durable_hydrations: self.durable_hydrations.load(Ordering::Relaxed),
            remote_fetches: self.remote_fetches.load(Ordering::Relaxed),
            coalesced_waits: self.coalesced_waits.load(Ordering::Relaxed),
            persist_failures: self.persist_failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub memory_hits: u64,
    pub durable_hydrations: u64,
    pub remote_fetches: u64,
    pub coalesced_waits: u64,
    pub persist_failures: u64,
}

impl MetricsSnapshot {
    /// Share of catalog reads that avoided a remote download.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.memory_hits + self.durable_hydrations;
        let total = hits + self.remote_fetches;
        if total == 0 {
            return 0.0;
        }
        hits as f64 / total as f64
    }

    pub fn format_report(&self) -> String {
        [
            "Player Cache Metrics".to_string(),
            "=".repeat(40),
            format!("  Memory hits:        {}", self.memory_hits),
            format!("  Disk hydrations:    {}", self.durable_hydrations),
            format!("  Remote fetches:     {}", self.remote_fetches),
            format!("  Coalesced waits:    {}", self.coalesced_waits),
            format!("  Persist failures:   {}", self.persist_failures),
            format!("  Hit rate:           {:.1}%", self.hit_rate() * 100.0),
        ]
        .join("\n")
    }
}
