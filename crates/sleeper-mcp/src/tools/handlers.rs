//! MCP tool handler implementations.
//!
//! Handlers return [`Outcome`]: `Err` carries an already-formed failure
//! response, so input and provider errors short-circuit with `?`.

use serde_json::{json, Value};
use std::collections::HashSet;

use sleeper_enrich::{is_questionable, MatchupPairing};
use sleeper_transport::{FetchError, TrendKind};
use sleeper_types::{extract_input, PlayerDetails, ToolResponse};

use super::advice::{
    compare, fantasy_impact, lineup_changes, lineup_grade, player_recommendation,
    projected_points, start_sit_advice, waiver_reason, WaiverPriority,
};
use super::inputs::{
    validate_range, ClearCacheInput, ComparePlayersInput, GetLeagueRostersInput,
    GetPlayerDetailsInput, GetStartSitAdviceInput, GetTrendingPlayersInput, GetUserInfoInput,
    GetUserLeaguesInput, GetWaiverSuggestionsInput, LeagueIdInput, LeagueUserWeekInput,
    LeagueWeekInput, ResearchPlayerStatusInput, SearchPlayersInput,
};
use crate::state::ToolDispatcher;

pub(crate) type Outcome = Result<ToolResponse, ToolResponse>;

/// Trending window and size scanned for waiver suggestions.
const WAIVER_LOOKBACK_HOURS: u32 = 24;
const WAIVER_TRENDING_LIMIT: u32 = 50;
const WAIVER_CANDIDATES: usize = 20;

pub(crate) fn fetch_failure(err: FetchError) -> ToolResponse {
    ToolResponse::error_kind(err.kind(), err.to_string())
}

fn not_found(message: impl Into<String>) -> ToolResponse {
    ToolResponse::error_kind("not_found", message)
}

fn position_suffix(prefix: &str, position: Option<&str>) -> String {
    position
        .map(|p| format!(" {} {}", prefix, p))
        .unwrap_or_default()
}

impl ToolDispatcher {
    /// `week`, or the current week from the NFL state record.
    async fn resolve_week(&self, week: Option<u32>) -> Result<u32, ToolResponse> {
        match week {
            Some(week) => Ok(week),
            None => Ok(self
                .joiner
                .api()
                .nfl_state()
                .await
                .map_err(fetch_failure)?
                .week),
        }
    }

    pub(crate) async fn get_user_info(&self, input: Value) -> Outcome {
        let parsed: GetUserInfoInput = extract_input(input)?;
        let user = self
            .joiner
            .api()
            .user(&parsed.username_or_id)
            .await
            .map_err(fetch_failure)?;

        let username = user.username.clone().unwrap_or_default();
        let display = user.display_name.clone().unwrap_or_else(|| username.clone());
        Ok(ToolResponse::ok(json!({ "user": user })).with_message(format!(
            "Successfully retrieved user information for {} (@{})",
            display, username
        )))
    }

    pub(crate) async fn get_user_leagues(&self, input: Value) -> Outcome {
        let parsed: GetUserLeaguesInput = extract_input(input)?;
        let api = self.joiner.api();
        let season = match parsed.season {
            Some(season) => season,
            None => api.nfl_state().await.map_err(fetch_failure)?.season,
        };
        let leagues = api
            .user_leagues(&parsed.user_id, &parsed.sport, &season)
            .await
            .map_err(fetch_failure)?;

        let message = format!(
            "Found {} {} leagues for {} season",
            leagues.len(),
            parsed.sport.to_uppercase(),
            season
        );
        Ok(ToolResponse::ok(json!({
            "leagues": leagues,
            "count": leagues.len(),
            "season": season,
            "sport": parsed.sport,
        }))
        .with_message(message))
    }

    pub(crate) async fn get_league_info(&self, input: Value) -> Outcome {
        let parsed: LeagueIdInput = extract_input(input)?;
        let league = self
            .joiner
            .api()
            .league(&parsed.league_id)
            .await
            .map_err(fetch_failure)?;

        let message = format!(
            "Retrieved league information for \"{}\" ({} teams, {} status)",
            league.name, league.total_rosters, league.status
        );
        Ok(ToolResponse::ok(json!({ "league": league })).with_message(message))
    }

    pub(crate) async fn get_league_rosters(&self, input: Value) -> Outcome {
        let parsed: GetLeagueRostersInput = extract_input(input)?;

        if parsed.include_player_details {
            let joined = self
                .joiner
                .league_rosters(&parsed.league_id)
                .await
                .map_err(fetch_failure)?;
            let count = joined.value.len();
            return Ok(ToolResponse::ok(json!({
                "rosters": joined.value,
                "count": count,
            }))
            .with_cache_hit(joined.cache_hit)
            .with_message(format!(
                "Retrieved {} rosters with detailed player information",
                count
            )));
        }

        let rosters = self
            .joiner
            .league_rosters_raw(&parsed.league_id)
            .await
            .map_err(fetch_failure)?;
        let count = rosters.len();
        Ok(
            ToolResponse::ok(json!({ "rosters": rosters, "count": count }))
                .with_message(format!("Retrieved {} rosters", count)),
        )
    }

    pub(crate) async fn get_league_users(&self, input: Value) -> Outcome {
        let parsed: LeagueIdInput = extract_input(input)?;
        let users = self
            .joiner
            .api()
            .league_users(&parsed.league_id)
            .await
            .map_err(fetch_failure)?;
        let commissioners: Vec<_> = users.iter().filter(|u| u.is_commissioner()).collect();

        let message = format!(
            "Retrieved {} users ({} commissioners)",
            users.len(),
            commissioners.len()
        );
        Ok(ToolResponse::ok(json!({
            "users": users,
            "count": users.len(),
            "commissioners": commissioners,
        }))
        .with_message(message))
    }

    pub(crate) async fn get_current_matchups(&self, input: Value) -> Outcome {
        let parsed: LeagueWeekInput = extract_input(input)?;
        let week = self.resolve_week(parsed.week).await?;
        let groups = self
            .joiner
            .league_matchups(&parsed.league_id, week)
            .await
            .map_err(fetch_failure)?;

        let count = groups.len();
        Ok(ToolResponse::ok(json!({
            "matchups": groups,
            "week": week,
            "matchup_count": count,
        }))
        .with_message(format!("Retrieved {} matchups for week {}", count, week)))
    }

    pub(crate) async fn get_matchup_details(&self, input: Value) -> Outcome {
        let parsed: LeagueUserWeekInput = extract_input(input)?;
        let week = self.resolve_week(parsed.week).await?;
        let joined = self
            .joiner
            .matchup_pairing(&parsed.league_id, week, &parsed.user_id)
            .await
            .map_err(fetch_failure)?;

        match joined.value {
            MatchupPairing::Paired {
                matchup_id, sides, ..
            } => Ok(ToolResponse::ok(json!({
                "matchup": sides,
                "matchup_id": matchup_id,
                "week": week,
            }))
            .with_cache_hit(joined.cache_hit)
            .with_message(format!("Retrieved detailed matchup for week {}", week))),
            MatchupPairing::NotFound { reason } => Err(ToolResponse::error_kind(
                "no_matchup",
                "No matchup found for this user in the specified week",
            )
            .with_details(serde_json::to_value(&reason).unwrap_or(Value::Null))
            .with_cache_hit(joined.cache_hit)),
        }
    }

    pub(crate) async fn get_nfl_state(&self) -> Outcome {
        let state = self
            .joiner
            .api()
            .nfl_state()
            .await
            .map_err(fetch_failure)?;
        let message = format!(
            "Current NFL state: Week {} of {} season {}",
            state.week, state.season_type, state.season
        );
        Ok(ToolResponse::ok(json!({ "nfl_state": state })).with_message(message))
    }

    pub(crate) async fn search_players(&self, input: Value) -> Outcome {
        let parsed: SearchPlayersInput = extract_input(input)?;
        let limit = validate_range("limit", parsed.limit, 1, 50)?;
        let joined = self
            .joiner
            .search(&parsed.query, limit as usize)
            .await
            .map_err(fetch_failure)?;

        let count = joined.value.len();
        Ok(ToolResponse::ok(json!({
            "players": joined.value,
            "count": count,
            "query": parsed.query,
        }))
        .with_cache_hit(joined.cache_hit)
        .with_message(format!(
            "Found {} players matching \"{}\"",
            count, parsed.query
        )))
    }

    pub(crate) async fn get_trending_players(&self, input: Value) -> Outcome {
        let parsed: GetTrendingPlayersInput = extract_input(input)?;
        let limit = validate_range("limit", parsed.limit, 1, 100)?;
        let joined = self
            .joiner
            .trending(parsed.kind, parsed.lookback_hours, limit)
            .await
            .map_err(fetch_failure)?;

        let count = joined.value.len();
        Ok(ToolResponse::ok(json!({
            "trending_players": joined.value,
            "type": parsed.kind,
            "lookback_hours": parsed.lookback_hours,
            "count": count,
        }))
        .with_cache_hit(joined.cache_hit)
        .with_message(format!(
            "Retrieved top {} trending {} players from last {} hours",
            count, parsed.kind, parsed.lookback_hours
        )))
    }

    pub(crate) async fn get_player_details(&self, input: Value) -> Outcome {
        let parsed: GetPlayerDetailsInput = extract_input(input)?;
        let joined = self
            .joiner
            .player_details(&parsed.player_ids)
            .await
            .map_err(fetch_failure)?;

        let join = joined.value;
        let mut response = ToolResponse::ok(json!({
            "players": join.players,
            "count": join.count,
            "requested_count": join.requested_count,
        }))
        .with_cache_hit(joined.cache_hit)
        .with_message(format!(
            "Retrieved details for {}/{} requested players",
            join.count, join.requested_count
        ));
        if join.missing() > 0 {
            response = response.with_warning(format!(
                "{} requested player ids are not in the catalog",
                join.missing()
            ));
        }
        Ok(response)
    }

    pub(crate) async fn research_player_status(&self, input: Value) -> Outcome {
        let parsed: ResearchPlayerStatusInput = extract_input(input)?;
        let joined = self
            .joiner
            .search(&parsed.player_name, 5)
            .await
            .map_err(fetch_failure)?;
        let cache_hit = joined.cache_hit;
        let mut results = joined.value;

        let team_match = match &parsed.team {
            Some(team) if results.len() > 1 => results.iter().position(|p| {
                p.player
                    .team
                    .as_deref()
                    .is_some_and(|t| t.eq_ignore_ascii_case(team))
            }),
            _ => None,
        };
        if results.is_empty() {
            return Err(not_found(format!(
                "Player \"{}\" not found in Sleeper database",
                parsed.player_name
            ))
            .with_cache_hit(cache_hit));
        }
        let target = results.swap_remove(team_match.unwrap_or(0));
        let player = &target.player;

        let message = format!(
            "Researched status for {} ({} {})",
            target.full_name,
            player.team.as_deref().unwrap_or("FA"),
            target.display_position
        );
        Ok(ToolResponse::ok(json!({
            "analysis": {
                "current_status": {
                    "roster_status": player.status,
                    "injury_status": player.injury_label(),
                    "team": player.team,
                    "position": player.position,
                    "injury_details": target
                        .injury_display
                        .clone()
                        .unwrap_or_else(|| player.injury_label().to_string()),
                },
                "fantasy_impact": fantasy_impact(player),
                "recommendation": player_recommendation(player),
                "player": target,
            }
        }))
        .with_cache_hit(cache_hit)
        .with_message(message))
    }

    pub(crate) async fn analyze_lineup(&self, input: Value) -> Outcome {
        let parsed: LeagueUserWeekInput = extract_input(input)?;
        let week = self.resolve_week(parsed.week).await?;
        let roster = self
            .joiner
            .find_user_roster(&parsed.league_id, &parsed.user_id)
            .await
            .map_err(fetch_failure)?
            .ok_or_else(|| not_found("User not found in this league"))?;

        let joined = self
            .joiner
            .roster_with_owner(&roster, &parsed.league_id)
            .await
            .map_err(fetch_failure)?;
        let detail = joined.value;
        let questionable: Vec<&PlayerDetails> = detail
            .all_players
            .iter()
            .filter(|p| is_questionable(&p.player))
            .collect();

        let message = format!(
            "Analyzed lineup for {} - Week {}",
            detail.owner.display_name, week
        );
        Ok(ToolResponse::ok(json!({
            "analysis": {
                "user": detail.owner,
                "week": week,
                "lineup": {
                    "starters": detail.starters,
                    "bench": detail.bench,
                    "total_projected_points": projected_points(&detail.starters),
                },
                "questionable_players": questionable,
                "recommendations": lineup_changes(&detail.starters, &detail.bench),
                "waiver_suggestions": [],
                "overall_grade": lineup_grade(&detail.starters),
            }
        }))
        .with_cache_hit(joined.cache_hit)
        .with_message(message))
    }

    pub(crate) async fn get_waiver_suggestions(&self, input: Value) -> Outcome {
        let parsed: GetWaiverSuggestionsInput = extract_input(input)?;
        let api = self.joiner.api();
        let (trending, roster) = tokio::try_join!(
            api.trending(TrendKind::Add, WAIVER_LOOKBACK_HOURS, WAIVER_TRENDING_LIMIT),
            self.joiner
                .find_user_roster(&parsed.league_id, &parsed.user_id),
        )
        .map_err(fetch_failure)?;

        let owned: HashSet<&str> = roster
            .as_ref()
            .map(|r| r.players.iter().map(String::as_str).collect())
            .unwrap_or_default();
        let available: Vec<_> = trending
            .iter()
            .filter(|t| !owned.contains(t.player_id.as_str()))
            .collect();
        let candidate_ids: Vec<String> = available
            .iter()
            .take(WAIVER_CANDIDATES)
            .map(|t| t.player_id.clone())
            .collect();

        let joined = self
            .joiner
            .player_details(&candidate_ids)
            .await
            .map_err(fetch_failure)?;
        let position = parsed.position.as_deref().map(str::to_uppercase);
        let suggestions: Vec<Value> = joined
            .value
            .players
            .into_iter()
            .filter(|p| position.as_deref().map_or(true, |pos| p.player.is_eligible_at(pos)))
            .enumerate()
            .map(|(index, player)| {
                let adds = available
                    .iter()
                    .find(|t| t.player_id == player.id())
                    .map_or(0, |t| t.count);
                json!({
                    "trending_adds": adds,
                    "priority": WaiverPriority::for_index(index),
                    "reason": waiver_reason(&player.player, adds),
                    "player": player,
                })
            })
            .collect();

        let count = suggestions.len();
        let mut response = ToolResponse::ok(json!({
            "suggestions": suggestions,
            "position_filter": parsed.position,
            "count": count,
        }))
        .with_cache_hit(joined.cache_hit)
        .with_message(format!(
            "Generated {} waiver suggestions{}",
            count,
            position_suffix("for", parsed.position.as_deref())
        ));
        if roster.is_none() {
            response = response.with_warning("User has no roster in this league; nothing excluded");
        }
        Ok(response)
    }

    pub(crate) async fn get_transactions(&self, input: Value) -> Outcome {
        let parsed: LeagueWeekInput = extract_input(input)?;
        let week = self.resolve_week(parsed.week).await?;
        let joined = self
            .joiner
            .transactions(&parsed.league_id, week)
            .await
            .map_err(fetch_failure)?;

        let count = joined.value.len();
        Ok(ToolResponse::ok(json!({
            "transactions": joined.value,
            "week": week,
            "count": count,
        }))
        .with_cache_hit(joined.cache_hit)
        .with_message(format!(
            "Retrieved {} transactions for week {}",
            count, week
        )))
    }

    pub(crate) async fn compare_players(&self, input: Value) -> Outcome {
        let parsed: ComparePlayersInput = extract_input(input)?;
        let ids = vec![parsed.player1_id.clone(), parsed.player2_id.clone()];
        let joined = self
            .joiner
            .player_details(&ids)
            .await
            .map_err(fetch_failure)?;

        let find = |id: &str| joined.value.players.iter().find(|p| p.id() == id);
        let (Some(p1), Some(p2)) = (find(&parsed.player1_id), find(&parsed.player2_id)) else {
            return Err(not_found("One or both players not found").with_cache_hit(joined.cache_hit));
        };

        let message = format!("Compared {} vs {}", p1.full_name, p2.full_name);
        Ok(ToolResponse::ok(json!({
            "player1": p1,
            "player2": p2,
            "comparison": compare(p1, p2),
            "context": parsed.context.as_deref().unwrap_or("general comparison"),
        }))
        .with_cache_hit(joined.cache_hit)
        .with_message(message))
    }

    pub(crate) async fn get_start_sit_advice(&self, input: Value) -> Outcome {
        let parsed: GetStartSitAdviceInput = extract_input(input)?;
        let week = self.resolve_week(parsed.week).await?;
        let roster = self
            .joiner
            .find_user_roster(&parsed.league_id, &parsed.user_id)
            .await
            .map_err(fetch_failure)?
            .ok_or_else(|| not_found("User not found in this league"))?;
        let joined = self
            .joiner
            .roster_with_owner(&roster, &parsed.league_id)
            .await
            .map_err(fetch_failure)?;

        let detail = joined.value;
        let position = parsed.position.as_deref().map(str::to_uppercase);
        let players: Vec<PlayerDetails> = detail
            .all_players
            .into_iter()
            .filter(|p| position.as_deref().map_or(true, |pos| p.player.is_eligible_at(pos)))
            .collect();
        let advice = start_sit_advice(players);

        let count = advice.len();
        Ok(ToolResponse::ok(json!({
            "advice": advice,
            "user": detail.owner,
            "week": week,
            "position_filter": parsed.position,
            "count": count,
        }))
        .with_cache_hit(joined.cache_hit)
        .with_message(format!(
            "Generated start/sit advice for {} players{}",
            count,
            position_suffix("at", parsed.position.as_deref())
        )))
    }

    /// Confirm-gated reset. Without confirmation nothing is touched and the
    /// call is reported as declined.
    pub(crate) async fn clear_cache(&self, input: Value) -> Outcome {
        let parsed: ClearCacheInput = extract_input(input)?;
        if !parsed.confirm {
            return Ok(
                ToolResponse::ok(json!({ "status": "declined", "action": "none" }))
                    .with_message("Cache clear operation cancelled - confirmation required")
                    .with_warning(
                        "Cache clear requires confirmation. Set 'confirm' to true to proceed.",
                    ),
            );
        }

        self.cache().reset().await;
        Ok(
            ToolResponse::ok(json!({ "status": "cleared", "action": "cache_cleared" }))
                .with_message(
                    "Player data cache cleared successfully. Fresh data will be fetched on next request.",
                ),
        )
    }

    pub(crate) async fn cache_status(&self) -> Outcome {
        let status = self.cache().status();
        let message = format!(
            "{} players cached ({})",
            status.player_count,
            if status.is_fresh { "fresh" } else { "stale" }
        );
        Ok(ToolResponse::ok(json!({ "cache": status })).with_message(message))
    }
}
