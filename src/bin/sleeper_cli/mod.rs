//! CLI subcommand implementations for sleeper

pub mod cache;
pub mod players;
pub mod tool;
