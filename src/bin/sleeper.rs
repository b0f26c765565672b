//! sleeper: command-line access to the Sleeper fantasy football API
//!
//! Player lookups are served from the local catalog cache, which is
//! downloaded on first use and refreshed once it is older than its TTL.
//!
//! ## Example Usage
//!
//! ```bash
//! # Find a player by name
//! sleeper search "josh allen"
//!
//! # Resolve ids
//! sleeper player 4984 8150
//!
//! # Most dropped players over the last two days
//! sleeper trending --drop --lookback-hours 48
//!
//! # Inspect or rebuild the catalog cache
//! sleeper cache status
//! sleeper cache refresh
//!
//! # Call any MCP tool directly
//! sleeper tool get_nfl_state
//! sleeper tool get_league_info --input '{"league_id": "1048..."}'
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};

mod sleeper_cli;

use sleeper_cli::{
    cache::CacheCmd,
    players::{PlayerCmd, SearchCmd, TrendingCmd},
    tool::ToolCmd,
};
use sleeper_mcp::{init_tracing, ToolDispatcher};

#[derive(Parser)]
#[command(
    name = "sleeper",
    author,
    version,
    about = "Sleeper fantasy football toolkit",
    long_about = "Cached player lookups, trending activity and direct tool calls against the Sleeper API.\n\n\
                  Data lives under $SLEEPER_HOME (default ~/.sleeper-mcp)."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the player catalog by name
    Search(SearchCmd),

    /// Show catalog details for player ids
    Player(PlayerCmd),

    /// Most added or dropped players across Sleeper leagues
    Trending(TrendingCmd),

    /// Inspect and maintain the player catalog cache
    Cache(CacheCmd),

    /// Invoke an MCP tool with JSON input
    Tool(ToolCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let Cli { command, json } = Cli::parse();
    let dispatcher = ToolDispatcher::new()?;

    match command {
        Commands::Search(cmd) => cmd.execute(&dispatcher, json).await,
        Commands::Player(cmd) => cmd.execute(&dispatcher, json).await,
        Commands::Trending(cmd) => cmd.execute(&dispatcher, json).await,
        Commands::Cache(cmd) => cmd.execute(&dispatcher, json).await,
        Commands::Tool(cmd) => cmd.execute(&dispatcher, json).await,
    }
}
