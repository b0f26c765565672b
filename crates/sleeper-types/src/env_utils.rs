//! Environment variable helpers.
//!
//! Every knob in the workspace is an environment variable with a default;
//! these helpers keep the parse-or-default boilerplate in one place. Empty
//! values are treated the same as unset ones.
//!
//! ```
//! use sleeper_types::env_utils::{env_bool_or, env_var_or};
//!
//! let ttl_hours: u64 = env_var_or("SLEEPER_CACHE_TTL_HOURS", 24);
//! let tool_log = env_bool_or("SLEEPER_TOOL_LOG", true);
//! # let _ = (ttl_hours, tool_log);
//! ```

use std::str::FromStr;
use std::time::Duration;

fn raw(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn truthy(value: &str) -> bool {
    matches!(
        value.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Parse a variable, `None` when unset, empty, or unparseable.
pub fn env_var<T: FromStr>(key: &str) -> Option<T> {
    raw(key).and_then(|v| v.parse().ok())
}

pub fn env_var_or<T: FromStr>(key: &str, default: T) -> T {
    env_var(key).unwrap_or(default)
}

/// `true` only for "1", "true", "yes" or "on" (any case).
pub fn env_bool(key: &str) -> bool {
    raw(key).map(|v| truthy(&v)).unwrap_or(false)
}

pub fn env_bool_or(key: &str, default: bool) -> bool {
    match raw(key) {
        Some(v) => truthy(&v),
        None => default,
    }
}

pub fn env_string_or(key: &str, default: &str) -> String {
    raw(key).unwrap_or_else(|| default.to_string())
}

/// Whole seconds from a variable; zero is rejected in favour of the default.
pub fn env_secs_or(key: &str, default: Duration) -> Duration {
    env_var::<u64>(key)
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}
