//! League-scoped collections.
//!
//! None of these are cached: they are fetched for one request, joined
//! against the player catalog, and dropped.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::null_as_default;

/// Sentinel id of the placeholder owner attached when a roster's owner is unresolvable.
pub const UNKNOWN_OWNER_ID: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct League {
    pub league_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub sport: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub total_rosters: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roster_positions: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub scoring_settings: BTreeMap<String, f64>,
    #[serde(default)]
    pub settings: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RosterSettings {
    #[serde(default)]
    pub wins: u32,
    #[serde(default)]
    pub losses: u32,
    #[serde(default)]
    pub ties: u32,
    #[serde(default)]
    pub fpts: f64,
    #[serde(default)]
    pub fpts_decimal: f64,
    #[serde(default)]
    pub fpts_against: f64,
    #[serde(default)]
    pub fpts_against_decimal: f64,
    #[serde(default)]
    pub total_moves: u32,
    #[serde(default)]
    pub waiver_position: u32,
    #[serde(default)]
    pub waiver_budget_used: u32,
}

/// A team in a league.
///
/// `starters` is expected to be a subset of `players`, but the provider does
/// not guarantee it and the joins tolerate violations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub roster_id: u32,
    /// `None` for orphaned rosters.
    #[serde(default)]
    pub owner_id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub starters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reserve: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taxi: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub settings: RosterSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_id: Option<String>,
}

impl Roster {
    pub fn new(roster_id: u32, owner_id: Option<&str>) -> Self {
        Self {
            roster_id,
            owner_id: owner_id.map(str::to_string),
            players: Vec::new(),
            starters: Vec::new(),
            reserve: None,
            taxi: None,
            settings: RosterSettings::default(),
            league_id: None,
        }
    }

    pub fn with_players<I, S>(mut self, players: I, starters: &[&str]) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.players = players.into_iter().map(Into::into).collect();
        self.starters = starters.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id.as_deref() == Some(user_id)
    }
}

/// A league member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueUser {
    pub user_id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_name: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    /// Commissioner flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_owner: Option<bool>,
}

impl LeagueUser {
    pub fn new(user_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: None,
            display_name: display_name.into(),
            avatar: None,
            metadata: None,
            is_owner: None,
        }
    }

    /// Deterministic stand-in for an owner that cannot be resolved.
    pub fn placeholder() -> Self {
        Self {
            user_id: UNKNOWN_OWNER_ID.to_string(),
            username: Some("Unknown".to_string()),
            display_name: "Unknown User".to_string(),
            avatar: None,
            metadata: None,
            is_owner: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.user_id == UNKNOWN_OWNER_ID
    }

    pub fn is_commissioner(&self) -> bool {
        self.is_owner.unwrap_or(false)
    }

    pub fn team_name(&self) -> Option<&str> {
        self.metadata
            .as_ref()
            .and_then(|m| m.get("team_name"))
            .and_then(Value::as_str)
    }
}

/// One side of a weekly head-to-head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matchup {
    pub roster_id: u32,
    /// Pairing group; `None` on bye weeks.
    #[serde(default)]
    pub matchup_id: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub points: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub starters: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_points: Option<f64>,
}

impl Matchup {
    pub fn new(roster_id: u32, matchup_id: u32) -> Self {
        Self {
            roster_id,
            matchup_id: Some(matchup_id),
            points: 0.0,
            starters: Vec::new(),
            players: Vec::new(),
            custom_points: None,
        }
    }

    /// Player ids on this side that are not in its starter list.
    pub fn bench_ids(&self) -> Vec<String> {
        self.players
            .iter()
            .filter(|id| !self.starters.contains(id))
            .cloned()
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingEntry {
    pub player_id: String,
    pub count: u32,
}

/// Season/week state record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NflState {
    #[serde(default)]
    pub season: String,
    /// "pre", "regular" or "post".
    #[serde(default)]
    pub season_type: String,
    #[serde(default)]
    pub week: u32,
    #[serde(default)]
    pub leg: u32,
    #[serde(default)]
    pub display_week: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season_start_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub league_create_season: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_season: Option<String>,
}

impl NflState {
    pub fn is_season_active(&self) -> bool {
        matches!(self.season_type.as_str(), "regular" | "post")
    }
}

/// A league transaction (trade, waiver claim, free-agent move).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub transaction_id: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub roster_ids: Vec<u32>,
    /// player id -> receiving roster id
    #[serde(default)]
    pub adds: Option<BTreeMap<String, u32>>,
    /// player id -> releasing roster id
    #[serde(default)]
    pub drops: Option<BTreeMap<String, u32>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub draft_picks: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub waiver_budget: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub leg: u32,
    /// Epoch milliseconds.
    #[serde(default)]
    pub created: i64,
    #[serde(default)]
    pub creator: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub consenter_ids: Vec<u32>,
}

impl Transaction {
    /// Every player id touched by this transaction, adds first.
    pub fn player_ids(&self) -> Vec<String> {
        self.adds
            .iter()
            .chain(self.drops.iter())
            .flat_map(|m| m.keys().cloned())
            .collect()
    }
}
