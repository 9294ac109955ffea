// ABOUTME: Defines all error types for the gateway using thiserror.
// ABOUTME: Each concern has its own error enum, unified under GatewayError.

use serde_json::{Map, Value};

/// Top-level error type for the gateway library.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("MCP error: {0}")]
    Mcp(#[from] McpError),
}

/// Errors from building the gateway configuration or its HTTP clients.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised inside a tool body.
///
/// These never leave a tool: [`crate::tool::Tool::execute`] folds them into a
/// failure envelope whose `error` is the display string below.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("{0}")]
    NotConfigured(String),

    #[error("Request timeout while connecting to {service}")]
    Timeout { service: &'static str },

    #[error("Network error while contacting {service}: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} rate limit exceeded. {advice}")]
    RateLimited {
        service: &'static str,
        advice: String,
        retry_after: Option<u64>,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{service} error: {status} ({message})")]
    Upstream {
        service: &'static str,
        status: u16,
        message: String,
    },

    #[error("Malformed response from {service}: {reason}")]
    MalformedResponse {
        service: &'static str,
        reason: String,
    },
}

impl ToolError {
    /// Stable category name reported as `details.kind` in failure envelopes.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::InvalidParams(_) => "invalid_params",
            ToolError::NotConfigured(_) => "not_configured",
            ToolError::Timeout { .. } => "timeout",
            ToolError::Transport { .. } => "transport",
            ToolError::RateLimited { .. } => "rate_limited",
            ToolError::NotFound(_) => "not_found",
            ToolError::Upstream { .. } => "upstream",
            ToolError::MalformedResponse { .. } => "malformed_response",
        }
    }

    /// Returns true if the upstream refused the call because of rate limiting.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, ToolError::RateLimited { .. })
    }

    /// Auxiliary metadata attached to the failure envelope.
    pub fn details(&self) -> Map<String, Value> {
        let mut details = Map::new();
        details.insert("kind".into(), Value::from(self.kind()));
        match self {
            ToolError::Upstream { status, .. } => {
                details.insert("status".into(), Value::from(*status));
            }
            ToolError::RateLimited {
                retry_after: Some(secs),
                ..
            } => {
                details.insert("retry_after".into(), Value::from(*secs));
            }
            _ => {}
        }
        details
    }
}

/// Errors from registry lookup and registration.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool '{0}' is already registered")]
    Duplicate(String),

    #[error("Tool '{name}' has an invalid schema: {reason}")]
    InvalidSchema { name: String, reason: String },
}

/// Errors from the MCP server loop.
#[derive(Debug, thiserror::Error)]
pub enum McpError {
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
