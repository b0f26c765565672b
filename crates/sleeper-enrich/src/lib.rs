//! Cross-reference joins between league collections and the player catalog.
//!
//! The pure join functions ([`details`], [`roster`], [`matchup`],
//! [`trending`], [`transactions`]) operate on already-fetched data and a
//! [`CatalogSnapshot`](sleeper_cache::CatalogSnapshot). [`EnrichmentJoiner`]
//! fetches the per-request collections and feeds them through those joins.
//!
//! Cached player records are never modified; derived fields are attached to
//! per-call [`PlayerDetails`](sleeper_types::PlayerDetails) copies.

pub mod details;
pub mod joiner;
pub mod matchup;
pub mod roster;
pub mod transactions;
pub mod trending;

pub use details::{enrich, is_questionable, resolve, starter_set, DetailsJoin, QUESTIONABLE_STATUSES};
pub use joiner::{EnrichmentJoiner, Joined};
pub use matchup::{group_matchups, pair_matchup, MatchupGroup, MatchupPairing, MatchupSide, PairingFailure};
pub use roster::{attach_owner, member_index, MemberIndex, RosterDetail};
pub use transactions::{EnrichedTransaction, MovedPlayer};
pub use trending::{join_trending, TrendingPlayer};
