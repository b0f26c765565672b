//! Path-addressed JSON sources.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use sleeper_types::{env_secs_or, env_string_or};

use crate::error::FetchError;

pub const DEFAULT_BASE_URL: &str = "https://api.sleeper.app/v1";

/// Read-only fetch-by-path. Paths start with `/` and may carry a query string.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError>;
}

#[async_trait]
impl<T: RemoteSource + ?Sized> RemoteSource for Arc<T> {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        (**self).get_json(path).await
    }
}

/// HTTP source backed by a blocking `ureq` agent.
///
/// Requests run on the blocking pool so a multi-megabyte catalog download
/// never stalls the async runtime.
#[derive(Clone, Debug)]
pub struct HttpSource {
    base_url: String,
    agent: ureq::Agent,
}

impl HttpSource {
    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
    const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Self::DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .timeout_connect(Self::CONNECT_TIMEOUT.min(timeout))
            .user_agent(concat!("sleeper-toolkit/", env!("CARGO_PKG_VERSION")))
            .build();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            agent,
        }
    }

    /// Configuration via environment variables:
    ///
    /// - `SLEEPER_API_URL` - base URL (default: `https://api.sleeper.app/v1`)
    /// - `SLEEPER_HTTP_TIMEOUT_SECS` - per-request timeout (default: 30)
    pub fn from_env() -> Self {
        Self::with_timeout(
            &env_string_or("SLEEPER_API_URL", DEFAULT_BASE_URL),
            env_secs_or("SLEEPER_HTTP_TIMEOUT_SECS", Self::DEFAULT_TIMEOUT),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

fn fetch_blocking(agent: &ureq::Agent, url: &str, path: &str) -> Result<Value, FetchError> {
    match agent.get(url).set("Accept", "application/json").call() {
        // `into_reader` has no body size cap; the player catalog is several MB.
        Ok(response) => {
            serde_json::from_reader(response.into_reader()).map_err(|e| FetchError::Decode {
                path: path.to_string(),
                message: e.to_string(),
            })
        }
        Err(ureq::Error::Status(status, response)) => {
            let body = response.into_string().unwrap_or_default();
            Err(FetchError::from_status(status, path, &body))
        }
        Err(ureq::Error::Transport(err)) => Err(FetchError::Transport(err.to_string())),
    }
}

#[async_trait]
impl RemoteSource for HttpSource {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url_for(path);
        let agent = self.agent.clone();
        let owned_path = path.to_string();
        let start = Instant::now();

        let result = tokio::task::spawn_blocking(move || fetch_blocking(&agent, &url, &owned_path))
            .await
            .map_err(|e| FetchError::Transport(format!("request task failed: {}", e)))?;

        let elapsed_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => debug!(path = path, elapsed_ms = elapsed_ms, "sleeper request ok"),
            Err(err) => warn!(
                path = path,
                elapsed_ms = elapsed_ms,
                kind = err.kind(),
                error = %err,
                "sleeper request failed"
            ),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalized() {
        let source = HttpSource::new("https://example.test/v1/");
        assert_eq!(source.base_url(), "https://example.test/v1");
        assert_eq!(
            source.url_for("/state/nfl"),
            "https://example.test/v1/state/nfl"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        // Port 9 on localhost: nothing listens, connection is refused.
        let source = HttpSource::with_timeout("http://127.0.0.1:9", Duration::from_secs(2));
        let err = source.get_json("/state/nfl").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)), "got {:?}", err);
    }
}
