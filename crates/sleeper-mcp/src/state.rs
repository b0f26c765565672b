use anyhow::Result;
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use uuid::Uuid;

use sleeper_cache::{CacheConfig, ReferenceCache};
use sleeper_enrich::EnrichmentJoiner;
use sleeper_transport::{HttpSource, RemoteSource, SleeperApi};

use crate::logging::{redact_sensitive, LogConfig, LogRecord, McpLogger};
use crate::paths::{default_paths, SleeperPaths};
use crate::tools::handlers::Outcome;

pub use sleeper_types::{ToolMeta, ToolResponse};

/// Every tool name [`ToolDispatcher::dispatch`] accepts.
pub const TOOL_NAMES: [&str; 19] = [
    "get_user_info",
    "get_user_leagues",
    "get_league_info",
    "get_league_rosters",
    "get_league_users",
    "get_current_matchups",
    "get_matchup_details",
    "get_nfl_state",
    "search_players",
    "get_trending_players",
    "get_player_details",
    "research_player_status",
    "analyze_lineup",
    "get_waiver_suggestions",
    "get_transactions",
    "compare_players",
    "get_start_sit_advice",
    "clear_cache",
    "cache_status",
];

/// Routes tool calls to handlers and records each call in the tool log.
pub struct ToolDispatcher {
    pub(crate) joiner: EnrichmentJoiner,
    pub logger: McpLogger,
}

impl ToolDispatcher {
    /// Dispatcher over the live API, configured from the environment.
    pub fn new() -> Result<Self> {
        Self::from_paths(&default_paths())
    }

    pub fn from_paths(paths: &SleeperPaths) -> Result<Self> {
        let source: Arc<dyn RemoteSource> = Arc::new(HttpSource::from_env());
        let config = CacheConfig::from_env(&paths.cache_dir());
        let logger = McpLogger::new(LogConfig::from_env(paths));
        Ok(Self::with_components(source, config, logger))
    }

    /// Dispatcher over an explicit source, cache location and logger.
    pub fn with_components(
        source: Arc<dyn RemoteSource>,
        config: CacheConfig,
        logger: McpLogger,
    ) -> Self {
        let api = SleeperApi::with_sport(source.clone(), &config.sport);
        let cache = ReferenceCache::new(config, source);
        Self {
            joiner: EnrichmentJoiner::new(api, cache),
            logger,
        }
    }

    pub fn logger(&self) -> &McpLogger {
        &self.logger
    }

    pub fn cache(&self) -> &ReferenceCache {
        self.joiner.cache()
    }

    pub fn joiner(&self) -> &EnrichmentJoiner {
        &self.joiner
    }

    pub async fn dispatch(&self, tool: &str, mut input: Value) -> ToolResponse {
        let meta = ToolMeta::take_from(&mut input).unwrap_or_default();
        let request_id = meta
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let start = Instant::now();

        let result = self.dispatch_inner(tool, input.clone()).await;

        let duration_ms = start.elapsed().as_millis() as u64;
        let result = result.with_duration(duration_ms);
        debug!(
            tool,
            request_id = %request_id,
            duration_ms,
            success = result.success,
            cache_hit = ?result.cache_hit,
            "tool call finished"
        );

        let record = LogRecord {
            ts: Utc::now().to_rfc3339(),
            request_id,
            tool: tool.to_string(),
            input: redact_sensitive(&input),
            output: redact_sensitive(&result.to_json()),
            duration_ms,
            success: result.success,
            error: result.error.clone(),
            cache_hit: result.cache_hit,
            llm_reason: meta.reason,
            tags: meta.tags,
        };
        if let Err(e) = self.logger.log_tool_call(&record) {
            warn!(error = %e, "failed to write tool log");
        }

        result
    }

    async fn dispatch_inner(&self, tool: &str, input: Value) -> ToolResponse {
        let outcome: Outcome = match tool {
            "get_user_info" => self.get_user_info(input).await,
            "get_user_leagues" => self.get_user_leagues(input).await,
            "get_league_info" => self.get_league_info(input).await,
            "get_league_rosters" => self.get_league_rosters(input).await,
            "get_league_users" => self.get_league_users(input).await,
            "get_current_matchups" => self.get_current_matchups(input).await,
            "get_matchup_details" => self.get_matchup_details(input).await,
            "get_nfl_state" => self.get_nfl_state().await,
            "search_players" => self.search_players(input).await,
            "get_trending_players" => self.get_trending_players(input).await,
            "get_player_details" => self.get_player_details(input).await,
            "research_player_status" => self.research_player_status(input).await,
            "analyze_lineup" => self.analyze_lineup(input).await,
            "get_waiver_suggestions" => self.get_waiver_suggestions(input).await,
            "get_transactions" => self.get_transactions(input).await,
            "compare_players" => self.compare_players(input).await,
            "get_start_sit_advice" => self.get_start_sit_advice(input).await,
            "clear_cache" => self.clear_cache(input).await,
            "cache_status" => self.cache_status().await,
            _ => Err(ToolResponse::error_kind(
                "unknown_tool",
                format!("Unknown tool: {}", tool),
            )),
        };
        outcome.unwrap_or_else(|failure| failure)
    }
}
