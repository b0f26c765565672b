//! Input structs for MCP tool handlers.
//!
//! Optional fields carry their defaults here; bounds that serde cannot
//! express are checked by [`validate_range`].

use serde::Deserialize;

use sleeper_transport::TrendKind;
use sleeper_types::ToolResponse;

fn default_true() -> bool {
    true
}

fn default_search_limit() -> u32 {
    10
}

fn default_lookback_hours() -> u32 {
    24
}

fn default_trending_limit() -> u32 {
    25
}

fn default_sport() -> String {
    sleeper_transport::DEFAULT_SPORT.to_string()
}

/// Reject `value` outside `min..=max` with an `invalid_input` response.
pub fn validate_range(field: &str, value: u32, min: u32, max: u32) -> Result<u32, ToolResponse> {
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(ToolResponse::error_kind(
            "invalid_input",
            format!(
                "Invalid input: {} must be between {} and {} (got {})",
                field, min, max, value
            ),
        ))
    }
}

#[derive(Debug, Deserialize)]
pub struct GetUserInfoInput {
    pub username_or_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GetUserLeaguesInput {
    pub user_id: String,
    /// Defaults to the current season from the NFL state record.
    #[serde(default)]
    pub season: Option<String>,
    #[serde(default = "default_sport")]
    pub sport: String,
}

#[derive(Debug, Deserialize)]
pub struct LeagueIdInput {
    pub league_id: String,
}

#[derive(Debug, Deserialize)]
pub struct GetLeagueRostersInput {
    pub league_id: String,
    #[serde(default = "default_true")]
    pub include_player_details: bool,
}

#[derive(Debug, Deserialize)]
pub struct LeagueWeekInput {
    pub league_id: String,
    #[serde(default)]
    pub week: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct LeagueUserWeekInput {
    pub league_id: String,
    pub user_id: String,
    #[serde(default)]
    pub week: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SearchPlayersInput {
    pub query: String,
    #[serde(default = "default_search_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct GetTrendingPlayersInput {
    #[serde(default, rename = "type")]
    pub kind: TrendKind,
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,
    #[serde(default = "default_trending_limit")]
    pub limit: u32,
}

#[derive(Debug, Deserialize)]
pub struct GetPlayerDetailsInput {
    pub player_ids: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResearchPlayerStatusInput {
    pub player_name: String,
    #[serde(default)]
    pub team: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetWaiverSuggestionsInput {
    pub league_id: String,
    pub user_id: String,
    #[serde(default)]
    pub position: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ComparePlayersInput {
    pub player1_id: String,
    pub player2_id: String,
    #[serde(default)]
    pub context: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GetStartSitAdviceInput {
    pub league_id: String,
    pub user_id: String,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub week: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ClearCacheInput {
    #[serde(default)]
    pub confirm: bool,
}
