//! Sleeper fantasy football toolkit
//!
//! The `sleeper` binary is a thin CLI over the workspace crates:
//!
//! - [`sleeper_cache`]: durable, TTL-bounded player catalog
//! - [`sleeper_enrich`]: joins of league collections against the catalog
//! - [`sleeper_mcp`]: the tool dispatcher also served over MCP
//!
//! This crate holds the human-readable output formatting shared by the CLI
//! commands.

pub mod output;

pub use sleeper_cache as cache;
pub use sleeper_enrich as enrich;
pub use sleeper_mcp as mcp;
pub use sleeper_transport as transport;
pub use sleeper_types as types;
