use anyhow::{Context, Result};
use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use sleeper_types::{env_bool_or, env_var_or};

use crate::paths::{default_paths, SleeperPaths};

const REDACTED: &str = "***redacted***";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub rotation_mb: u64,
}

impl LogConfig {
    /// `SLEEPER_TOOL_LOG` toggles the log; `SLEEPER_TOOL_LOG_ROTATION_MB` sets the rotation size.
    pub fn from_env(paths: &SleeperPaths) -> Self {
        Self {
            enabled: env_bool_or("SLEEPER_TOOL_LOG", true),
            path: paths.logs_dir(),
            rotation_mb: env_var_or("SLEEPER_TOOL_LOG_ROTATION_MB", 50),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_paths().logs_dir(),
            rotation_mb: 50,
        }
    }
}

/// Append-only JSONL log of tool calls, one file per process, rotated by size.
#[derive(Debug)]
pub struct McpLogger {
    config: Mutex<LogConfig>,
    file: Mutex<Option<File>>,
    file_path: Mutex<Option<PathBuf>>,
}

impl McpLogger {
    pub fn new(config: LogConfig) -> Self {
        Self {
            config: Mutex::new(config),
            file: Mutex::new(None),
            file_path: Mutex::new(None),
        }
    }

    pub fn config(&self) -> LogConfig {
        self.config.lock().clone()
    }

    pub fn update_config(&self, new_config: LogConfig) {
        *self.config.lock() = new_config;
        *self.file.lock() = None;
        *self.file_path.lock() = None;
    }

    /// File currently being appended to, if one has been opened.
    pub fn current_file(&self) -> Option<PathBuf> {
        self.file_path.lock().clone()
    }

    pub fn log_tool_call(&self, record: &LogRecord) -> Result<()> {
        let config = self.config.lock().clone();
        if !config.enabled {
            return Ok(());
        }

        fs::create_dir_all(&config.path)
            .with_context(|| format!("creating log dir {}", config.path.display()))?;
        self.rotate_if_needed(&config);

        let mut file_guard = self.file.lock();
        if file_guard.is_none() {
            let file_path = next_log_path(&config);
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&file_path)
                .with_context(|| format!("opening {}", file_path.display()))?;
            *file_guard = Some(file);
            *self.file_path.lock() = Some(file_path);
        }

        if let Some(file) = file_guard.as_mut() {
            let line = serde_json::to_string(record)?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    fn rotate_if_needed(&self, config: &LogConfig) {
        let current = self.file_path.lock().clone();
        if let Some(path) = current {
            if let Ok(metadata) = fs::metadata(&path) {
                let size_mb = metadata.len() / (1024 * 1024);
                if size_mb >= config.rotation_mb {
                    *self.file.lock() = None;
                    *self.file_path.lock() = None;
                }
            }
        }
    }
}

fn next_log_path(config: &LogConfig) -> PathBuf {
    let ts = Utc::now().format("%Y%m%d-%H%M%S%.3f");
    config.path.join(format!("mcp-{}.jsonl", ts))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub ts: String,
    pub request_id: String,
    pub tool: String,
    pub input: Value,
    pub output: Value,
    pub duration_ms: u64,
    pub success: bool,
    pub error: Option<String>,
    pub cache_hit: Option<bool>,
    pub llm_reason: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub fn redact_sensitive(value: &Value) -> Value {
    fn is_sensitive(key: &str) -> bool {
        let key = key.to_lowercase();
        ["key", "token", "secret", "password"]
            .iter()
            .any(|needle| key.contains(needle))
    }

    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = if is_sensitive(k) {
                        Value::String(REDACTED.to_string())
                    } else {
                        redact_sensitive(v)
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::Array(arr) => Value::Array(arr.iter().map(redact_sensitive).collect()),
        _ => value.clone(),
    }
}

/// Install the stderr `tracing` subscriber.
///
/// The filter comes from `SLEEPER_LOG`, then `RUST_LOG`, then `info`.
/// Stdout is left alone because it carries the MCP transport.
pub fn init_tracing() {
    let filter = std::env::var("SLEEPER_LOG")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .and_then(|spec| tracing_subscriber::EnvFilter::try_new(spec).ok())
        .unwrap_or_else(|| tracing_subscriber::EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
