//! MCP server over the Sleeper fantasy-football API.
//!
//! [`ToolDispatcher`] routes a tool name and JSON input to a handler and
//! returns a [`ToolResponse`]. The binary wraps it in an rmcp stdio server.

pub mod logging;
pub mod paths;
pub mod state;
pub mod tools;

pub use logging::{init_tracing, LogConfig, McpLogger};
pub use paths::{default_paths, SleeperPaths};
pub use state::{ToolDispatcher, ToolResponse, TOOL_NAMES};
