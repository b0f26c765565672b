use thiserror::Error;

/// Failure of a single provider request.
///
/// `Clone` so one in-flight catalog refresh can hand the same outcome to
/// every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Resource not found: {path}")]
    NotFound { path: String },

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Sleeper API error: {status} {message}")]
    Upstream { status: u16, message: String },

    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Invalid response from {path}: {message}")]
    Decode { path: String, message: String },
}

impl FetchError {
    /// Map a non-2xx status to its error variant.
    pub fn from_status(status: u16, path: &str, body: &str) -> Self {
        match status {
            404 => FetchError::NotFound {
                path: path.to_string(),
            },
            429 => FetchError::RateLimited,
            _ => FetchError::Upstream {
                status,
                message: summarize_body(body),
            },
        }
    }

    /// Stable tag used in tool responses (`error_details.kind`).
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::NotFound { .. } => "not_found",
            FetchError::RateLimited => "rate_limited",
            FetchError::Upstream { .. } => "upstream",
            FetchError::Transport(_) => "transport",
            FetchError::Decode { .. } => "decode",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::RateLimited | FetchError::Transport(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::NotFound { .. })
    }
}

const MAX_BODY_CHARS: usize = 200;

fn summarize_body(body: &str) -> String {
    let body = body.trim();
    if body.chars().count() <= MAX_BODY_CHARS {
        body.to_string()
    } else {
        let cut: String = body.chars().take(MAX_BODY_CHARS).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            FetchError::from_status(404, "/user/x", ""),
            FetchError::NotFound {
                path: "/user/x".to_string()
            }
        );
        assert_eq!(FetchError::from_status(429, "/x", ""), FetchError::RateLimited);
        match FetchError::from_status(503, "/x", " Service Unavailable \n") {
            FetchError::Upstream { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "Service Unavailable");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_kind_and_retry() {
        assert_eq!(FetchError::RateLimited.kind(), "rate_limited");
        assert!(FetchError::RateLimited.is_retryable());
        assert!(FetchError::Transport("reset".into()).is_retryable());
        assert!(!FetchError::from_status(500, "/x", "").is_retryable());
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(500);
        let FetchError::Upstream { message, .. } = FetchError::from_status(500, "/x", &body) else {
            panic!("expected upstream");
        };
        assert_eq!(message.len(), MAX_BODY_CHARS + 3);
    }
}
