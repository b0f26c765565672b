//! MCP tool implementations.
//!
//! - `inputs`: input structs and range checks
//! - `advice`: lineup, waiver and start/sit heuristics
//! - `handlers`: one handler per tool

pub mod advice;
pub(crate) mod handlers;
pub mod inputs;

pub use inputs::*;
