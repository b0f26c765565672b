//! The player catalog cache.
//!
//! Freshness policy, in order:
//!
//! 1. First use after construction (or reset) tries the durable snapshot.
//! 2. A non-empty in-memory catalog younger than the TTL is served as is.
//! 3. Otherwise the full catalog is downloaded, swapped in atomically, and
//!    written back to disk (best-effort).
//!
//! A failed download is returned to the caller and leaves the current
//! catalog in place. Concurrent callers needing a refresh share a single
//! in-flight task.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use tracing::{debug, info, warn};

use sleeper_transport::{FetchError, RemoteSource, SleeperApi};
use sleeper_types::Player;

use crate::catalog::CatalogSnapshot;
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::metrics::{CacheMetrics, MetricsSnapshot};
use crate::snapshot::{FsSnapshotStore, SnapshotMeta, SnapshotStore};

/// Where the catalog behind a read came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadOrigin {
    Memory,
    Durable,
    Remote,
}

impl ReadOrigin {
    pub fn is_cache_hit(self) -> bool {
        !matches!(self, ReadOrigin::Remote)
    }
}

/// A fresh catalog and how it was obtained.
#[derive(Debug, Clone)]
pub struct CacheRead {
    pub snapshot: Arc<CatalogSnapshot>,
    pub origin: ReadOrigin,
}

#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub initialized: bool,
    pub player_count: usize,
    /// Epoch milliseconds.
    pub last_refreshed_at: Option<i64>,
    pub age_ms: Option<i64>,
    pub is_fresh: bool,
    pub ttl_ms: i64,
    pub refresh_in_flight: bool,
    pub storage_dir: String,
    pub metrics: MetricsSnapshot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlightKind {
    /// Hydrate if needed, then download only if still stale.
    Ensure,
    /// Download unconditionally.
    Force,
}

type FlightFuture = Shared<BoxFuture<'static, Result<ReadOrigin, FetchError>>>;

struct Flight {
    id: u64,
    kind: FlightKind,
    future: FlightFuture,
}

enum Claim {
    /// Await this flight for the caller's own result.
    Run(FlightFuture),
    /// An incompatible flight is running; wait for it, then claim again.
    Wait(FlightFuture),
}

struct Inner {
    config: CacheConfig,
    api: SleeperApi<Arc<dyn RemoteSource>>,
    store: Arc<dyn SnapshotStore>,
    clock: Arc<dyn Clock>,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
    /// Set once durable hydration has been attempted.
    initialized: AtomicBool,
    /// Bumped by every reset. A flight only installs or persists a catalog
    /// if the epoch it started in is still current.
    epoch: Arc<AtomicU64>,
    /// Serializes snapshot writes against the clear in `reset`.
    persist_lock: Arc<Mutex<()>>,
    flight: Mutex<Option<Flight>>,
    next_flight_id: AtomicU64,
    metrics: CacheMetrics,
}

/// Cheap-to-clone handle; clones share one catalog.
#[derive(Clone)]
pub struct ReferenceCache {
    inner: Arc<Inner>,
}

impl ReferenceCache {
    /// Cache persisting to `config.storage_dir`, on the system clock.
    pub fn new(config: CacheConfig, source: Arc<dyn RemoteSource>) -> Self {
        let store = Arc::new(FsSnapshotStore::new(&config.storage_dir));
        Self::with_parts(config, source, store, Arc::new(SystemClock))
    }

    pub fn with_parts(
        config: CacheConfig,
        source: Arc<dyn RemoteSource>,
        store: Arc<dyn SnapshotStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let api = SleeperApi::with_sport(source, &config.sport);
        Self {
            inner: Arc::new(Inner {
                config,
                api,
                store,
                clock,
                snapshot: RwLock::new(Arc::new(CatalogSnapshot::empty())),
                initialized: AtomicBool::new(false),
                epoch: Arc::new(AtomicU64::new(0)),
                persist_lock: Arc::new(Mutex::new(())),
                flight: Mutex::new(None),
                next_flight_id: AtomicU64::new(0),
                metrics: CacheMetrics::default(),
            }),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// The catalog currently held, without any freshness check.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.inner.snapshot.read().clone()
    }

    /// Make sure the catalog is within the TTL, refreshing if needed.
    pub async fn ensure_fresh(&self) -> Result<CacheRead, FetchError> {
        if let Some(snapshot) = self.inner.fresh_in_memory() {
            self.inner.metrics.record_memory_hit();
            return Ok(CacheRead {
                snapshot,
                origin: ReadOrigin::Memory,
            });
        }
        loop {
            let epoch = self.inner.current_epoch();
            let outcome = match self.claim(FlightKind::Ensure) {
                Claim::Run(flight) | Claim::Wait(flight) => flight.await,
            };
            if self.inner.current_epoch() != epoch {
                debug!("cache reset during refresh, retrying");
                continue;
            }
            return Ok(CacheRead {
                snapshot: self.snapshot(),
                origin: outcome?,
            });
        }
    }

    /// Download the catalog regardless of its age. Returns the new size.
    pub async fn force_refresh(&self) -> Result<usize, FetchError> {
        loop {
            match self.claim(FlightKind::Force) {
                Claim::Run(flight) => {
                    let epoch = self.inner.current_epoch();
                    let outcome = flight.await;
                    if self.inner.current_epoch() != epoch {
                        continue;
                    }
                    outcome?;
                    return Ok(self.snapshot().len());
                }
                Claim::Wait(flight) => {
                    let _ = flight.await;
                }
            }
        }
    }

    pub async fn get(&self, id: &str) -> Result<Option<Player>, FetchError> {
        Ok(self.ensure_fresh().await?.snapshot.get(id).cloned())
    }

    /// Players for `ids` in order, unknown ids skipped.
    pub async fn get_many<S: AsRef<str>>(&self, ids: &[S]) -> Result<Vec<Player>, FetchError> {
        Ok(self.ensure_fresh().await?.snapshot.get_many(ids))
    }

    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<Player>, FetchError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(self.ensure_fresh().await?.snapshot.search(query, limit))
    }

    pub async fn active_startable(&self, position: Option<&str>) -> Result<Vec<Player>, FetchError> {
        Ok(self.ensure_fresh().await?.snapshot.active_startable(position))
    }

    /// Drop the catalog from memory and disk; the next read starts cold.
    ///
    /// A refresh already running is detached: it keeps running but can no
    /// longer install or persist its result.
    pub async fn reset(&self) {
        {
            let mut snapshot = self.inner.snapshot.write();
            self.inner.epoch.fetch_add(1, Ordering::AcqRel);
            *snapshot = Arc::new(CatalogSnapshot::empty());
            self.inner.initialized.store(false, Ordering::Release);
        }
        *self.inner.flight.lock() = None;

        let store = self.inner.store.clone();
        let persist_lock = self.inner.persist_lock.clone();
        let cleared = tokio::task::spawn_blocking(move || {
            let _guard = persist_lock.lock();
            store.clear();
        })
        .await;
        if let Err(e) = cleared {
            warn!(error = %e, "snapshot clear task failed");
        }
        info!("player cache reset");
    }

    pub fn status(&self) -> CacheStatus {
        let snapshot = self.snapshot();
        let now = self.inner.clock.now_ms();
        let ttl_ms = self.inner.config.ttl_ms();
        CacheStatus {
            initialized: self.inner.initialized.load(Ordering::Acquire),
            player_count: snapshot.len(),
            last_refreshed_at: snapshot.last_refreshed_at(),
            age_ms: snapshot.age_ms(now),
            is_fresh: snapshot.is_fresh(now, ttl_ms),
            ttl_ms,
            refresh_in_flight: self.inner.flight.lock().is_some(),
            storage_dir: self.inner.config.storage_dir.display().to_string(),
            metrics: self.metrics(),
        }
    }

    fn claim(&self, kind: FlightKind) -> Claim {
        let mut slot = self.inner.flight.lock();
        match slot.as_ref() {
            Some(flight) if kind == FlightKind::Ensure || flight.kind == FlightKind::Force => {
                self.inner.metrics.record_coalesced_wait();
                debug!(flight = flight.id, "joining in-flight catalog refresh");
                Claim::Run(flight.future.clone())
            }
            Some(flight) => Claim::Wait(flight.future.clone()),
            None => {
                let flight = self.spawn_flight(kind);
                let future = flight.future.clone();
                *slot = Some(flight);
                Claim::Run(future)
            }
        }
    }

    /// Run the refresh as its own task so it completes even if every
    /// waiter goes away. The task clears its marker when done.
    fn spawn_flight(&self, kind: FlightKind) -> Flight {
        let id = self.inner.next_flight_id.fetch_add(1, Ordering::Relaxed) + 1;
        let inner = self.inner.clone();
        let epoch = inner.current_epoch();
        let handle = tokio::spawn(async move {
            let result = inner.run_flight(kind, epoch).await;
            {
                let mut slot = inner.flight.lock();
                if slot.as_ref().is_some_and(|f| f.id == id) {
                    *slot = None;
                }
            }
            result
        });
        let future = async move {
            handle.await.unwrap_or_else(|e| {
                Err(FetchError::Transport(format!(
                    "catalog refresh task failed: {}",
                    e
                )))
            })
        }
        .boxed()
        .shared();
        Flight { id, kind, future }
    }
}

impl Inner {
    fn current_epoch(&self) -> u64 {
        self.epoch.load(Ordering::Acquire)
    }

    /// Swap in `snapshot` unless a reset happened since `epoch`.
    fn install(&self, snapshot: Arc<CatalogSnapshot>, epoch: u64) -> bool {
        let mut slot = self.snapshot.write();
        if self.current_epoch() != epoch {
            return false;
        }
        *slot = snapshot;
        self.initialized.store(true, Ordering::Release);
        true
    }

    fn fresh_in_memory(&self) -> Option<Arc<CatalogSnapshot>> {
        if !self.initialized.load(Ordering::Acquire) {
            return None;
        }
        let snapshot = self.snapshot.read().clone();
        snapshot
            .is_fresh(self.clock.now_ms(), self.config.ttl_ms())
            .then_some(snapshot)
    }

    async fn run_flight(&self, kind: FlightKind, epoch: u64) -> Result<ReadOrigin, FetchError> {
        if kind == FlightKind::Ensure {
            if !self.initialized.load(Ordering::Acquire) {
                if self.hydrate(epoch).await {
                    return Ok(ReadOrigin::Durable);
                }
            } else if self.fresh_in_memory().is_some() {
                // Someone else refreshed between the caller's check and this flight.
                return Ok(ReadOrigin::Memory);
            }
        }
        if self.current_epoch() == epoch {
            self.fetch_remote(epoch).await?;
        }
        Ok(ReadOrigin::Remote)
    }

    async fn hydrate(&self, epoch: u64) -> bool {
        let store = self.store.clone();
        let now = self.clock.now_ms();
        let ttl_ms = self.config.ttl_ms();
        let loaded = tokio::task::spawn_blocking(move || store.load(now, ttl_ms))
            .await
            .unwrap_or_else(|e| {
                warn!(error = %e, "snapshot load task failed");
                None
            });

        match loaded {
            Some((players, meta)) => {
                let count = players.len();
                let snapshot = Arc::new(CatalogSnapshot::new(players, meta.last_updated));
                if !self.install(snapshot, epoch) {
                    debug!("cache reset during hydration, discarding loaded catalog");
                    return false;
                }
                self.metrics.record_durable_hydration();
                info!(
                    players = count,
                    age_hours = (now - meta.last_updated) / 3_600_000,
                    "hydrated player catalog from disk"
                );
                true
            }
            None => {
                debug!("durable snapshot unusable, will fetch");
                let _slot = self.snapshot.write();
                if self.current_epoch() == epoch {
                    self.initialized.store(true, Ordering::Release);
                }
                false
            }
        }
    }

    async fn fetch_remote(&self, epoch: u64) -> Result<(), FetchError> {
        let start = Instant::now();
        self.metrics.record_remote_fetch();
        info!(sport = %self.config.sport, "fetching player catalog from remote");

        let players = match self.api.players().await {
            Ok(players) => players,
            Err(e) => {
                warn!(
                    error = %e,
                    kind = e.kind(),
                    kept_players = self.snapshot.read().len(),
                    "player catalog fetch failed, keeping current snapshot"
                );
                return Err(e);
            }
        };

        let now = self.clock.now_ms();
        let snapshot = Arc::new(CatalogSnapshot::new(players, now));
        let count = snapshot.len();
        if !self.install(snapshot.clone(), epoch) {
            debug!("cache reset during fetch, discarding fetched catalog");
            return Ok(());
        }
        info!(
            players = count,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "player catalog refreshed"
        );

        let store = self.store.clone();
        let current = self.epoch.clone();
        let persist_lock = self.persist_lock.clone();
        let meta = SnapshotMeta::new(now, count);
        let saved = tokio::task::spawn_blocking(move || {
            let _guard = persist_lock.lock();
            if current.load(Ordering::Acquire) != epoch {
                return true;
            }
            store.save(snapshot.players(), &meta)
        })
        .await
        .unwrap_or(false);
        if !saved {
            self.metrics.record_persist_failure();
        }
        Ok(())
    }
}
