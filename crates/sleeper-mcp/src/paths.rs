use std::path::PathBuf;

use sleeper_types::env_var;

#[derive(Debug, Clone)]
pub struct SleeperPaths {
    base: PathBuf,
}

impl SleeperPaths {
    pub fn from_base(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base_dir(&self) -> PathBuf {
        self.base.clone()
    }

    /// Durable player snapshot (`players.json` + `cache-meta.json`).
    pub fn cache_dir(&self) -> PathBuf {
        self.base.join("cache")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.base.join("logs").join("mcp")
    }
}

/// `$SLEEPER_HOME`, or `~/.sleeper-mcp`.
pub fn default_paths() -> SleeperPaths {
    let base = env_var::<PathBuf>("SLEEPER_HOME").unwrap_or_else(|| {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sleeper-mcp")
    });
    SleeperPaths::from_base(base)
}
