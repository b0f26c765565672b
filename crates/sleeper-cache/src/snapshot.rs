//! Durable copy of the player catalog.
//!
//! The snapshot is a pair of files in one directory:
//!
//! - `players.json`: id-keyed object of full player records
//! - `cache-meta.json`: `{"lastUpdated": <epoch ms>, "playerCount": <n>, "version": "1.0.0"}`
//!
//! The pair is trusted only when both parse, the count matches, the version
//! is current, and the age is under the TTL. Anything else is a miss.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use sleeper_types::PlayerMap;

use crate::paths::{
    atomic_write_json, meta_path, players_path, read_json, remove_if_exists, CacheIoError,
};

pub const FORMAT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMeta {
    pub last_updated: i64,
    pub player_count: usize,
    pub version: String,
}

impl SnapshotMeta {
    pub fn new(last_updated: i64, player_count: usize) -> Self {
        Self {
            last_updated,
            player_count,
            version: FORMAT_VERSION.to_string(),
        }
    }
}

/// Why a stored pair was not trusted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Missing,
    Unreadable(String),
    VersionMismatch(String),
    Expired { age_ms: i64 },
    FromFuture { ahead_ms: i64 },
    CountMismatch { expected: usize, actual: usize },
}

/// Best-effort persistence of the catalog. Implementations never fail
/// loudly: read problems are a miss, write problems are logged.
pub trait SnapshotStore: Send + Sync {
    /// The stored pair if it is consistent and younger than `ttl_ms`.
    fn load(&self, now_ms: i64, ttl_ms: i64) -> Option<(PlayerMap, SnapshotMeta)>;

    /// Returns whether both files were written.
    fn save(&self, players: &PlayerMap, meta: &SnapshotMeta) -> bool;

    fn clear(&self);
}

/// Filesystem-backed [`SnapshotStore`].
#[derive(Debug, Clone)]
pub struct FsSnapshotStore {
    dir: PathBuf,
}

impl FsSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Load with the reason for rejection, for diagnostics.
    pub fn inspect(&self, now_ms: i64, ttl_ms: i64) -> Result<(PlayerMap, SnapshotMeta), Rejection> {
        let players_file = players_path(&self.dir);
        let meta_file = meta_path(&self.dir);
        if !players_file.exists() || !meta_file.exists() {
            return Err(Rejection::Missing);
        }

        // Metadata first: an expired pair is rejected without parsing the large file.
        let meta: SnapshotMeta =
            read_json(&meta_file).map_err(|e| Rejection::Unreadable(e.to_string()))?;
        if meta.version != FORMAT_VERSION {
            return Err(Rejection::VersionMismatch(meta.version));
        }
        let age_ms = now_ms - meta.last_updated;
        if age_ms >= ttl_ms {
            return Err(Rejection::Expired { age_ms });
        }
        if -age_ms > ttl_ms {
            return Err(Rejection::FromFuture { ahead_ms: -age_ms });
        }

        let mut players: PlayerMap =
            read_json(&players_file).map_err(|e| Rejection::Unreadable(e.to_string()))?;
        if players.len() != meta.player_count {
            return Err(Rejection::CountMismatch {
                expected: meta.player_count,
                actual: players.len(),
            });
        }
        for (id, player) in players.iter_mut() {
            if player.player_id != *id {
                player.player_id = id.clone();
            }
        }
        Ok((players, meta))
    }

    fn write_pair(&self, players: &PlayerMap, meta: &SnapshotMeta) -> Result<(), CacheIoError> {
        // Entity file first; a crash before the meta write leaves a pair that fails the count check.
        atomic_write_json(&players_path(&self.dir), players)?;
        atomic_write_json(&meta_path(&self.dir), meta)
    }

    fn remove_pair(&self) -> Result<bool, CacheIoError> {
        let removed_meta = remove_if_exists(&meta_path(&self.dir))?;
        let removed_players = remove_if_exists(&players_path(&self.dir))?;
        Ok(removed_meta || removed_players)
    }
}

impl SnapshotStore for FsSnapshotStore {
    fn load(&self, now_ms: i64, ttl_ms: i64) -> Option<(PlayerMap, SnapshotMeta)> {
        match self.inspect(now_ms, ttl_ms) {
            Ok(pair) => Some(pair),
            Err(Rejection::Missing) => {
                debug!(dir = %self.dir.display(), "no durable player snapshot");
                None
            }
            Err(reason) => {
                info!(dir = %self.dir.display(), reason = ?reason, "ignoring durable player snapshot");
                None
            }
        }
    }

    fn save(&self, players: &PlayerMap, meta: &SnapshotMeta) -> bool {
        match self.write_pair(players, meta) {
            Ok(()) => {
                debug!(players = meta.player_count, dir = %self.dir.display(), "saved player snapshot");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to persist player snapshot");
                false
            }
        }
    }

    fn clear(&self) {
        match self.remove_pair() {
            Ok(true) => info!(dir = %self.dir.display(), "removed durable player snapshot"),
            Ok(false) => debug!("durable player snapshot already absent"),
            Err(e) => warn!(error = %e, "failed to remove durable player snapshot"),
        }
    }
}
