use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use sleeper_mcp::ToolDispatcher;
use sleeper_toolkit::output::{format_cache_status, to_json};

#[derive(Parser, Debug)]
pub struct CacheCmd {
    #[command(subcommand)]
    pub command: CacheSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum CacheSubcommand {
    /// Show catalog size, age and hit counters
    Status,

    /// Load the catalog, downloading only if it is missing or stale
    Warm,

    /// Download the catalog now regardless of age
    Refresh,

    /// Delete the catalog from memory and disk
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

impl CacheCmd {
    pub async fn execute(&self, dispatcher: &ToolDispatcher, json_output: bool) -> Result<()> {
        let cache = dispatcher.cache();
        match &self.command {
            CacheSubcommand::Status => {
                let status = cache.status();
                if json_output {
                    println!("{}", to_json(&status));
                } else {
                    print!("{}", format_cache_status(&status));
                }
            }
            CacheSubcommand::Warm => {
                let read = cache.ensure_fresh().await.context("warming player cache")?;
                let count = read.snapshot.len();
                if json_output {
                    println!(
                        "{}",
                        to_json(&json!({ "player_count": count, "origin": read.origin }))
                    );
                } else {
                    println!("{} players ready (from {:?})", count, read.origin);
                }
            }
            CacheSubcommand::Refresh => {
                let count = cache
                    .force_refresh()
                    .await
                    .context("refreshing player cache")?;
                if json_output {
                    println!("{}", to_json(&json!({ "player_count": count })));
                } else {
                    println!("Downloaded {} players", count);
                }
            }
            CacheSubcommand::Clear { yes } => {
                if !yes {
                    bail!("refusing to clear the player cache without --yes");
                }
                cache.reset().await;
                if json_output {
                    println!("{}", to_json(&json!({ "success": true, "action": "cache_cleared" })));
                } else {
                    println!("Player cache cleared");
                }
            }
        }
        Ok(())
    }
}
