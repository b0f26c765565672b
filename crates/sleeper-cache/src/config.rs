use std::path::{Path, PathBuf};
use std::time::Duration;

use sleeper_types::{env_string_or, env_var};

/// Default maximum age of a trusted catalog.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Settings for one [`ReferenceCache`](crate::ReferenceCache) instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    pub ttl: Duration,
    /// Directory holding `players.json` and `cache-meta.json`.
    pub storage_dir: PathBuf,
    /// Catalog sport segment, e.g. "nfl".
    pub sport: String,
}

impl CacheConfig {
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            ttl: DEFAULT_TTL,
            storage_dir: storage_dir.into(),
            sport: "nfl".to_string(),
        }
    }

    /// `SLEEPER_CACHE_TTL_HOURS` and `SLEEPER_SPORT` override the defaults.
    pub fn from_env(storage_dir: &Path) -> Self {
        let mut config = Self::new(storage_dir);
        if let Some(hours) = env_var::<u64>("SLEEPER_CACHE_TTL_HOURS").filter(|h| *h > 0) {
            config.ttl = Duration::from_secs(hours * 60 * 60);
        }
        config.sport = env_string_or("SLEEPER_SPORT", "nfl");
        config
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_sport(mut self, sport: &str) -> Self {
        self.sport = sport.to_string();
        self
    }

    pub fn ttl_ms(&self) -> i64 {
        self.ttl.as_millis() as i64
    }
}
