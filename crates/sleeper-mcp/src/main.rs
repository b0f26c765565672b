use std::sync::Arc;

use rmcp::{
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServiceExt,
};
use serde_json::Value;
use tracing::info;

use sleeper_mcp::{init_tracing, ToolDispatcher};

#[derive(Clone)]
struct SleeperMcpServer {
    dispatcher: Arc<ToolDispatcher>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl SleeperMcpServer {
    fn new(dispatcher: ToolDispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
            tool_router: Self::tool_router(),
        }
    }

    async fn dispatch_tool(
        &self,
        name: &str,
        params: Parameters<Value>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.dispatcher.dispatch(name, params.0).await;
        let content_text = if response.success {
            response.message.clone().unwrap_or_else(|| "ok".to_string())
        } else {
            response
                .error
                .clone()
                .unwrap_or_else(|| "error".to_string())
        };
        Ok(CallToolResult {
            content: vec![Content::text(content_text)],
            structured_content: Some(serde_json::to_value(&response).unwrap_or(Value::Null)),
            is_error: Some(!response.success),
            meta: None,
        })
    }

    #[tool(
        name = "get_user_info",
        description = "Get Sleeper user information by username or user ID"
    )]
    async fn get_user_info(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_user_info", params).await
    }

    #[tool(
        name = "get_user_leagues",
        description = "Get all leagues for a specific user in a given season"
    )]
    async fn get_user_leagues(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_user_leagues", params).await
    }

    #[tool(
        name = "get_league_info",
        description = "Get detailed information about a specific league including scoring settings and roster positions"
    )]
    async fn get_league_info(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_league_info", params).await
    }

    #[tool(
        name = "get_league_rosters",
        description = "Get all team rosters in a league with optional detailed player information"
    )]
    async fn get_league_rosters(
        &self,
        params: Parameters<Value>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_league_rosters", params).await
    }

    #[tool(
        name = "get_league_users",
        description = "Get all users/managers in a league with their team names and roles"
    )]
    async fn get_league_users(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_league_users", params).await
    }

    #[tool(
        name = "get_current_matchups",
        description = "Get current week matchups for a league showing who is playing against whom"
    )]
    async fn get_current_matchups(
        &self,
        params: Parameters<Value>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_current_matchups", params).await
    }

    #[tool(
        name = "get_matchup_details",
        description = "Get detailed matchup information for a specific user including opponent lineups"
    )]
    async fn get_matchup_details(
        &self,
        params: Parameters<Value>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_matchup_details", params).await
    }

    #[tool(
        name = "get_nfl_state",
        description = "Get current NFL season state including current week, season type, and important dates"
    )]
    async fn get_nfl_state(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_nfl_state", params).await
    }

    #[tool(
        name = "search_players",
        description = "Search for NFL players in the Sleeper database by name"
    )]
    async fn search_players(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("search_players", params).await
    }

    #[tool(
        name = "get_trending_players",
        description = "Get trending players based on recent add/drop activity across all Sleeper leagues"
    )]
    async fn get_trending_players(
        &self,
        params: Parameters<Value>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_trending_players", params).await
    }

    #[tool(
        name = "get_player_details",
        description = "Get detailed information for specific player IDs including position, team, and injury status"
    )]
    async fn get_player_details(
        &self,
        params: Parameters<Value>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_player_details", params).await
    }

    #[tool(
        name = "research_player_status",
        description = "Look up a player's current roster and injury status with a fantasy impact summary"
    )]
    async fn research_player_status(
        &self,
        params: Parameters<Value>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("research_player_status", params).await
    }

    #[tool(
        name = "analyze_lineup",
        description = "Analyze a user's lineup and provide recommendations for start/sit decisions and potential improvements"
    )]
    async fn analyze_lineup(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("analyze_lineup", params).await
    }

    #[tool(
        name = "get_waiver_suggestions",
        description = "Get waiver wire pickup suggestions based on trends, injuries, and team needs"
    )]
    async fn get_waiver_suggestions(
        &self,
        params: Parameters<Value>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_waiver_suggestions", params).await
    }

    #[tool(
        name = "get_transactions",
        description = "Get recent transactions (trades, waivers, free agent pickups) in a league"
    )]
    async fn get_transactions(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_transactions", params).await
    }

    #[tool(
        name = "compare_players",
        description = "Compare two players head-to-head with analysis of their fantasy value and current situations"
    )]
    async fn compare_players(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("compare_players", params).await
    }

    #[tool(
        name = "get_start_sit_advice",
        description = "Get specific start/sit advice for players on a user's roster based on matchups and current status"
    )]
    async fn get_start_sit_advice(
        &self,
        params: Parameters<Value>,
    ) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("get_start_sit_advice", params).await
    }

    #[tool(
        name = "clear_cache",
        description = "Clear the persistent player data cache to force fresh data retrieval on next request"
    )]
    async fn clear_cache(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("clear_cache", params).await
    }

    #[tool(
        name = "cache_status",
        description = "Report player catalog cache size, age, freshness and hit counters"
    )]
    async fn cache_status(&self, params: Parameters<Value>) -> Result<CallToolResult, McpError> {
        self.dispatch_tool("cache_status", params).await
    }
}

#[tool_handler]
impl rmcp::ServerHandler for SleeperMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Sleeper fantasy football MCP server. Start with get_nfl_state or get_user_info, then drill into leagues, rosters and matchups."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let dispatcher = ToolDispatcher::new()?;
    info!(
        storage = %dispatcher.cache().config().storage_dir.display(),
        "sleeper-mcp serving on stdio"
    );
    let server = SleeperMcpServer::new(dispatcher);
    let service = server.serve(rmcp::transport::stdio()).await?;
    service.waiting().await?;
    Ok(())
}
