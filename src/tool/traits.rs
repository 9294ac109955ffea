// ABOUTME: Defines the Tool trait - the core abstraction for gateway tools.
// ABOUTME: Tools have a name, description, schema, and async invoke method.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::ToolResult;
use crate::error::ToolError;

/// A tool that can be called by the orchestration layer.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the unique name of this tool.
    fn name(&self) -> &str;

    /// Returns a human-readable description for the LLM.
    fn description(&self) -> &str;

    /// Returns the JSON Schema for the tool's input parameters.
    fn schema(&self) -> serde_json::Value;

    /// Run the tool body. Errors are folded into the envelope by `execute`.
    async fn invoke(&self, params: serde_json::Value) -> Result<ToolResult, ToolError>;

    /// Execute the tool, always producing an envelope.
    async fn execute(&self, params: serde_json::Value) -> ToolResult {
        match self.invoke(params).await {
            Ok(result) => result,
            Err(err) => {
                tracing::debug!(tool = self.name(), kind = err.kind(), "tool call failed: {err}");
                ToolResult::from(err)
            }
        }
    }
}

/// Tool description as exposed to the orchestration layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: serde_json::Value,
}
