//! In-memory [`RemoteSource`] for tests.
//!
//! ```ignore
//! use sleeper_transport::testing::MockSource;
//! use sleeper_transport::RemoteSource;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let source = MockSource::new().with_json("/state/nfl", serde_json::json!({"week": 3}));
//! let state = source.get_json("/state/nfl").await.unwrap();
//! assert_eq!(state["week"], 3);
//! assert_eq!(source.calls("/state/nfl"), 1);
//! # });
//! ```

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::FetchError;
use crate::source::RemoteSource;

/// Canned responses keyed by exact path. Unknown paths answer `NotFound`.
#[derive(Default)]
pub struct MockSource {
    responses: Mutex<HashMap<String, Result<Value, FetchError>>>,
    calls: Mutex<HashMap<String, usize>>,
    delay: Mutex<Option<Duration>>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_json(self, path: &str, value: Value) -> Self {
        self.set_json(path, value);
        self
    }

    pub fn with_error(self, path: &str, err: FetchError) -> Self {
        self.set_error(path, err);
        self
    }

    /// Sleep this long inside every request, so concurrent callers overlap.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock() = Some(delay);
        self
    }

    pub fn set_json(&self, path: &str, value: Value) {
        self.responses.lock().insert(path.to_string(), Ok(value));
    }

    pub fn set_error(&self, path: &str, err: FetchError) {
        self.responses.lock().insert(path.to_string(), Err(err));
    }

    /// Number of requests made for `path`.
    pub fn calls(&self, path: &str) -> usize {
        self.calls.lock().get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().clear();
    }
}

#[async_trait]
impl RemoteSource for MockSource {
    async fn get_json(&self, path: &str) -> Result<Value, FetchError> {
        *self.calls.lock().entry(path.to_string()).or_insert(0) += 1;

        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self.responses.lock().get(path).cloned();
        response.unwrap_or_else(|| {
            Err(FetchError::NotFound {
                path: path.to_string(),
            })
        })
    }
}
