//! Player catalog records and their derived display fields.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::de::null_as_default;

/// Rank substituted for an absent `search_rank` so unranked players sort last.
pub const SEARCH_RANK_SENTINEL: u32 = 9999;

/// Display position used when a player has no position.
pub const UNKNOWN_POSITION: &str = "UNK";

/// Injury label used when a player has no injury status.
pub const HEALTHY_LABEL: &str = "Healthy";

/// The full catalog keyed by player id, as served by the provider.
pub type PlayerMap = BTreeMap<String, Player>;

/// Position priority used as the secondary search ordering.
///
/// QB < RB < WR < TE < K < DEF; anything else (or no position) sorts last.
pub fn position_priority(position: Option<&str>) -> u8 {
    match position {
        Some("QB") => 1,
        Some("RB") => 2,
        Some("WR") => 3,
        Some("TE") => 4,
        Some("K") => 5,
        Some("DEF") => 6,
        _ => 7,
    }
}

/// One record of the reference catalog.
///
/// Fields the provider sends but this crate does not interpret are kept in
/// `extra`, so a snapshot written to disk is a full copy of what was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(default)]
    pub player_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    /// Roster status, e.g. "Active" or "Inactive".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury_status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub injury_start_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fantasy_positions: Vec<String>,
    /// Popularity rank; `None` means unranked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_rank: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub years_exp: Option<u32>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Player {
    /// Create a bare player record (mostly useful in tests and fixtures).
    pub fn new(
        player_id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            player_id: player_id.into(),
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            search_full_name: None,
            position: None,
            team: None,
            status: None,
            injury_status: None,
            injury_start_date: None,
            fantasy_positions: Vec::new(),
            search_rank: None,
            age: None,
            years_exp: None,
            extra: Map::new(),
        }
    }

    pub fn with_position(mut self, position: impl Into<String>) -> Self {
        let position = position.into();
        self.fantasy_positions = vec![position.clone()];
        self.position = Some(position);
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    pub fn with_rank(mut self, rank: u32) -> Self {
        self.search_rank = Some(rank);
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_injury(mut self, status: impl Into<String>, since: Option<&str>) -> Self {
        self.injury_status = Some(status.into());
        self.injury_start_date = since.map(str::to_string);
        self
    }

    /// First and last name joined by a space, trimmed.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or(""),
            self.last_name.as_deref().unwrap_or("")
        )
        .trim()
        .to_string()
    }

    pub fn display_position(&self) -> &str {
        self.position.as_deref().unwrap_or(UNKNOWN_POSITION)
    }

    /// Injury status with an optional "(since <date>)" suffix; `None` when healthy.
    pub fn injury_display(&self) -> Option<String> {
        let status = self.injury_status.as_deref()?;
        Some(match self.injury_start_date.as_deref() {
            Some(since) => format!("{} (since {})", status, since),
            None => status.to_string(),
        })
    }

    /// Injury status, or the "Healthy" literal.
    pub fn injury_label(&self) -> &str {
        self.injury_status.as_deref().unwrap_or(HEALTHY_LABEL)
    }

    /// Search rank with absent ranks mapped to [`SEARCH_RANK_SENTINEL`].
    pub fn rank_or_sentinel(&self) -> u32 {
        self.search_rank.unwrap_or(SEARCH_RANK_SENTINEL)
    }

    pub fn is_eligible_at(&self, position: &str) -> bool {
        self.fantasy_positions
            .iter()
            .any(|p| p.eq_ignore_ascii_case(position))
    }
}

/// A player with the per-call derived fields attached.
///
/// Built from a clone of the cached record; the cached original is never
/// mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerDetails {
    #[serde(flatten)]
    pub player: Player,
    pub full_name: String,
    pub display_position: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub injury_display: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_starter: Option<bool>,
}

impl PlayerDetails {
    pub fn from_player(player: &Player) -> Self {
        Self {
            full_name: player.full_name(),
            display_position: player.display_position().to_string(),
            injury_display: player.injury_display(),
            is_starter: None,
            player: player.clone(),
        }
    }

    pub fn with_starter(mut self, is_starter: bool) -> Self {
        self.is_starter = Some(is_starter);
        self
    }

    pub fn id(&self) -> &str {
        &self.player.player_id
    }

    pub fn is_starter(&self) -> bool {
        self.is_starter.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_provider_record() {
        let json = serde_json::json!({
            "player_id": "4046",
            "first_name": "Patrick",
            "last_name": "Mahomes",
            "position": "QB",
            "team": "KC",
            "status": "Active",
            "injury_status": null,
            "fantasy_positions": ["QB"],
            "search_rank": 3,
            "college": "Texas Tech",
            "depth_chart_order": 1
        });
        let player: Player = serde_json::from_value(json).unwrap();
        assert_eq!(player.full_name(), "Patrick Mahomes");
        assert_eq!(player.search_rank, Some(3));
        assert!(player.injury_status.is_none());
        assert_eq!(player.extra["college"], "Texas Tech");
    }

    #[test]
    fn test_null_fantasy_positions() {
        let json = serde_json::json!({
            "player_id": "9999",
            "first_name": "No",
            "last_name": "Positions",
            "fantasy_positions": null
        });
        let player: Player = serde_json::from_value(json).unwrap();
        assert!(player.fantasy_positions.is_empty());
        assert_eq!(player.display_position(), UNKNOWN_POSITION);
    }

    #[test]
    fn test_injury_display() {
        let healthy = Player::new("1", "A", "B");
        assert_eq!(healthy.injury_display(), None);
        assert_eq!(healthy.injury_label(), HEALTHY_LABEL);

        let hurt = Player::new("2", "C", "D").with_injury("Questionable", None);
        assert_eq!(hurt.injury_display().as_deref(), Some("Questionable"));

        let dated = Player::new("3", "E", "F").with_injury("Out", Some("2024-10-01"));
        assert_eq!(
            dated.injury_display().as_deref(),
            Some("Out (since 2024-10-01)")
        );
    }

    #[test]
    fn test_full_name_trims_missing_parts() {
        let mut player = Player::new("KC", "", "");
        player.first_name = None;
        player.last_name = Some("Chiefs".to_string());
        assert_eq!(player.full_name(), "Chiefs");
    }

    #[test]
    fn test_position_priority_table() {
        assert!(position_priority(Some("QB")) < position_priority(Some("RB")));
        assert!(position_priority(Some("K")) < position_priority(Some("DEF")));
        assert_eq!(position_priority(Some("LB")), position_priority(None));
    }

    #[test]
    fn test_details_serialize_flat() {
        let player = Player::new("7", "Justin", "Jefferson")
            .with_position("WR")
            .with_rank(5);
        let details = PlayerDetails::from_player(&player).with_starter(true);
        let json = serde_json::to_value(&details).unwrap();
        assert_eq!(json["player_id"], "7");
        assert_eq!(json["full_name"], "Justin Jefferson");
        assert_eq!(json["display_position"], "WR");
        assert_eq!(json["is_starter"], true);
        assert!(json.get("injury_display").is_none());
    }
}
