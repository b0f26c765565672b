//! Shared types for the sleeper workspace.
//!
//! This crate provides the entity model used across the workspace, breaking
//! dependency cycles between the transport, cache, and enrichment crates.
//!
//! ## Entity Types
//!
//! - [`Player`](player::Player) - One record of the reference catalog
//! - [`PlayerDetails`](player::PlayerDetails) - A player with derived display fields attached
//! - [`Roster`](league::Roster), [`LeagueUser`](league::LeagueUser), [`Matchup`](league::Matchup)
//!   - Per-league collections, fetched fresh for every request
//! - [`TrendingEntry`](league::TrendingEntry) - Add/drop activity for one player id
//!
//! ## Tool Responses
//!
//! The [`response`] module contains the unified [`ToolResponse`] returned by
//! every tool, whether invoked over MCP or from the CLI.

pub mod env_utils;
pub mod league;
pub mod player;
pub mod response;

mod de;

pub use env_utils::{env_bool, env_bool_or, env_secs_or, env_string_or, env_var, env_var_or};
pub use league::{
    League, LeagueUser, Matchup, NflState, Roster, RosterSettings, Transaction, TrendingEntry,
    User, UNKNOWN_OWNER_ID,
};
pub use player::{
    position_priority, Player, PlayerDetails, PlayerMap, HEALTHY_LABEL, SEARCH_RANK_SENTINEL,
    UNKNOWN_POSITION,
};
pub use response::{extract_input, ToolMeta, ToolResponse};
