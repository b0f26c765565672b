//! Two-tier cache for the Sleeper player catalog.
//!
//! This crate provides:
//! - [`ReferenceCache`]: in-memory catalog with lazy disk hydration, TTL
//!   refresh and single-flight downloads
//! - [`FsSnapshotStore`]: the durable `players.json` + `cache-meta.json` pair
//! - [`CatalogSnapshot`]: an immutable catalog with lookup and search
//! - [`Clock`]: injectable time source ([`ManualClock`] for tests)

pub mod catalog;
pub mod clock;
pub mod config;
pub mod metrics;
pub mod paths;
pub mod reference;
pub mod snapshot;

pub use catalog::CatalogSnapshot;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, DEFAULT_TTL};
pub use metrics::{CacheMetrics, MetricsSnapshot};
pub use reference::{CacheRead, CacheStatus, ReadOrigin, ReferenceCache};
pub use snapshot::{FsSnapshotStore, Rejection, SnapshotMeta, SnapshotStore, FORMAT_VERSION};
