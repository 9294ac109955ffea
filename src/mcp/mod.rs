// ABOUTME: MCP module - Model Context Protocol server for the gateway.
// ABOUTME: Serves the tool registry as JSON-RPC 2.0 over a byte stream.

mod server;
mod types;

pub use server::McpServer;
pub use types::*;
