use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;

use sleeper_mcp::ToolDispatcher;
use sleeper_toolkit::output::{format_players, format_trending, to_json};
use sleeper_transport::TrendKind;

#[derive(Parser, Debug)]
pub struct SearchCmd {
    /// Name or part of a name
    pub query: String,

    /// Maximum number of results
    #[arg(long, default_value_t = 10)]
    pub limit: usize,
}

impl SearchCmd {
    pub async fn execute(&self, dispatcher: &ToolDispatcher, json_output: bool) -> Result<()> {
        let joined = dispatcher
            .joiner()
            .search(&self.query, self.limit)
            .await
            .context("player search failed")?;

        if json_output {
            println!(
                "{}",
                to_json(&json!({
                    "query": self.query,
                    "count": joined.value.len(),
                    "cache_hit": joined.cache_hit,
                    "players": joined.value,
                }))
            );
        } else {
            print!("{}", format_players(&joined.value));
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct PlayerCmd {
    /// Player ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

impl PlayerCmd {
    pub async fn execute(&self, dispatcher: &ToolDispatcher, json_output: bool) -> Result<()> {
        let joined = dispatcher
            .joiner()
            .player_details(&self.ids)
            .await
            .context("player lookup failed")?;
        let join = joined.value;

        if json_output {
            println!("{}", to_json(&join));
            return Ok(());
        }
        print!("{}", format_players(&join.players));
        if join.missing() > 0 {
            eprintln!(
                "{} of {} ids not found in the catalog",
                join.missing(),
                join.requested_count
            );
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct TrendingCmd {
    /// Rank by drops instead of adds
    #[arg(long)]
    pub drop: bool,

    /// Hours of activity to consider
    #[arg(long, default_value_t = 24)]
    pub lookback_hours: u32,

    /// Maximum number of results
    #[arg(long, default_value_t = 25)]
    pub limit: u32,
}

impl TrendingCmd {
    pub async fn execute(&self, dispatcher: &ToolDispatcher, json_output: bool) -> Result<()> {
        let kind = if self.drop {
            TrendKind::Drop
        } else {
            TrendKind::Add
        };
        let joined = dispatcher
            .joiner()
            .trending(kind, self.lookback_hours, self.limit)
            .await
            .with_context(|| format!("fetching trending {} players", kind))?;

        if json_output {
            println!(
                "{}",
                to_json(&json!({
                    "type": kind,
                    "lookback_hours": self.lookback_hours,
                    "trending_players": joined.value,
                }))
            );
        } else {
            println!(
                "Top trending {} players, last {} hours:",
                kind, self.lookback_hours
            );
            print!("{}", format_trending(&joined.value));
        }
        Ok(())
    }
}
