// ABOUTME: Prelude module - convenient imports for common use cases.
// ABOUTME: Use `use mcp_gateway::prelude::*;` to get started quickly.

pub use crate::config::GatewayConfig;
pub use crate::error::{ConfigError, GatewayError, McpError, RegistryError, ToolError};
pub use crate::mcp::McpServer;
pub use crate::tool::{Outcome, Registry, Tool, ToolDefinition, ToolResult};
pub use crate::tools::{
    AnalyzeDataTool, CalculateTool, GithubClient, ListIssuesTool, RepoInfoTool, RepoLanguagesTool, SearchReposTool,
    SendEmailTool, WeatherForecastTool, register_builtin,
};
