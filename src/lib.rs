// ABOUTME: Root module for mcp-gateway - HTTP API tools behind one envelope.
// ABOUTME: Re-exports the registry, built-in tools, and the MCP server.

pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod prelude;
pub mod tool;
pub mod tools;

pub use error::GatewayError;
