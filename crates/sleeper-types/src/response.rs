//! The response envelope every tool returns.
//!
//! MCP and the CLI print the same structure, so a tool behaves identically
//! whichever surface invoked it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,

    #[serde(default)]
    pub result: Value,

    /// Human-readable summary ("Found 3 players matching ...").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Structured failure context. Provider failures carry a `kind` tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_details: Option<Value>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,

    /// Whether the player catalog was served without a remote fetch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_hit: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl ToolResponse {
    pub fn ok(result: Value) -> Self {
        Self {
            success: true,
            result,
            message: None,
            error: None,
            error_details: None,
            warnings: Vec::new(),
            cache_hit: None,
            duration_ms: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            result: Value::Null,
            message: None,
            error: Some(message.into()),
            error_details: None,
            warnings: Vec::new(),
            cache_hit: None,
            duration_ms: None,
        }
    }

    /// Error tagged with a machine-readable kind in `error_details.kind`.
    pub fn error_kind(kind: &str, message: impl Into<String>) -> Self {
        Self::error(message).with_details(serde_json::json!({ "kind": kind }))
    }

    /// Error from an anyhow chain; causes land in `error_details.cause_chain`.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let mut response = Self::error(err.to_string());
        let chain: Vec<String> = err.chain().skip(1).map(|e| e.to_string()).collect();
        if !chain.is_empty() {
            response.error_details = Some(serde_json::json!({ "cause_chain": chain }));
        }
        response
    }

    /// Merge `details` into `error_details`; object keys are combined.
    pub fn with_details(mut self, details: Value) -> Self {
        self.error_details = Some(match (self.error_details.take(), details) {
            (Some(Value::Object(mut existing)), Value::Object(extra)) => {
                existing.extend(extra);
                Value::Object(existing)
            }
            (_, details) => details,
        });
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_cache_hit(mut self, hit: bool) -> Self {
        self.cache_hit = Some(hit);
        self
    }

    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn is_error(&self) -> bool {
        !self.success
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// The `error_details.kind` tag, if any.
    pub fn kind(&self) -> Option<&str> {
        self.error_details
            .as_ref()
            .and_then(|d| d.get("kind"))
            .and_then(Value::as_str)
    }
}

impl<T: Serialize> From<Result<T, anyhow::Error>> for ToolResponse {
    fn from(result: Result<T, anyhow::Error>) -> Self {
        match result {
            Ok(value) => Self::ok(serde_json::to_value(value).unwrap_or(Value::Null)),
            Err(err) => Self::from_error(&err),
        }
    }
}

/// Deserialize tool input, turning a schema mismatch into an error response.
///
/// ```
/// use serde::Deserialize;
/// use sleeper_types::extract_input;
///
/// #[derive(Deserialize)]
/// struct Input { username: String }
///
/// let input: Input = extract_input(serde_json::json!({"username": "alice"})).unwrap();
/// assert_eq!(input.username, "alice");
/// assert!(extract_input::<Input>(serde_json::json!({})).is_err());
/// ```
pub fn extract_input<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, ToolResponse> {
    serde_json::from_value(value).map_err(|e| {
        ToolResponse::error_kind("invalid_input", format!("Invalid input: {}", e))
    })
}

/// Caller-supplied `_meta` stripped from tool input before dispatch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolMeta {
    /// Why the caller invoked the tool; copied into the tool log.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl ToolMeta {
    /// Split `_meta` off an input object. Malformed metadata is dropped.
    pub fn take_from(input: &mut Value) -> Option<Self> {
        input
            .as_object_mut()
            .and_then(|obj| obj.remove("_meta"))
            .and_then(|meta| serde_json::from_value(meta).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_round_trips_through_json() {
        let response = ToolResponse::error_kind("not_found", "Resource not found");
        assert!(response.is_error());
        assert_eq!(response.kind(), Some("not_found"));
        let json = response.to_json();
        assert_eq!(json["error_details"]["kind"], "not_found");
        assert!(json.get("warnings").is_none());
    }

    #[test]
    fn test_with_details_merges_objects() {
        let response = ToolResponse::error_kind("upstream", "boom")
            .with_details(serde_json::json!({"status": 503}));
        let details = response.error_details.unwrap();
        assert_eq!(details["kind"], "upstream");
        assert_eq!(details["status"], 503);
    }

    #[test]
    fn test_from_anyhow_chain() {
        let err = anyhow::anyhow!("disk full").context("writing snapshot");
        let response = ToolResponse::from_error(&err);
        assert_eq!(response.error_message(), Some("writing snapshot"));
        assert_eq!(response.error_details.unwrap()["cause_chain"][0], "disk full");
    }

    #[test]
    fn test_meta_is_stripped() {
        let mut input = serde_json::json!({
            "query": "mahomes",
            "_meta": {"reason": "lineup check", "tags": ["demo"]}
        });
        let meta = ToolMeta::take_from(&mut input).unwrap();
        assert_eq!(meta.reason.as_deref(), Some("lineup check"));
        assert!(input.get("_meta").is_none());
        assert!(ToolMeta::take_from(&mut input).is_none());
    }

    #[test]
    fn test_builder_fields() {
        let response = ToolResponse::ok(serde_json::json!([1, 2]))
            .with_message("Found 2")
            .with_warning("partial")
            .with_cache_hit(true)
            .with_duration(7);
        let json = response.to_json();
        assert_eq!(json["message"], "Found 2");
        assert_eq!(json["warnings"][0], "partial");
        assert_eq!(json["cache_hit"], true);
        assert_eq!(json["duration_ms"], 7);
    }
}
