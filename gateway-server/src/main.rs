// ABOUTME: mcp-gateway binary - loads configuration from the environment and
// ABOUTME: serves the built-in tools over MCP on stdin/stdout.

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mcp_gateway::prelude::*;

/// Serve GitHub, weather, and email tools to MCP clients over stdio.
#[derive(Debug, Parser)]
#[command(name = "mcp-gateway", version, about)]
struct Args {
    /// Log filter used when RUST_LOG is unset (logs go to stderr).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Per-request HTTP timeout in seconds, overriding GATEWAY_REQUEST_TIMEOUT_SECS.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Print the tool definitions as JSON and exit.
    #[arg(long)]
    list_tools: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    // stdout carries the protocol, so logs must stay on stderr.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let mut config = GatewayConfig::from_env().context("failed to read configuration")?;
    if let Some(secs) = args.timeout_secs {
        config = config
            .with_timeout(Duration::from_secs(secs))
            .context("invalid --timeout-secs")?;
    }
    report_configuration(&config);

    let registry = Registry::with_builtin_tools(&config).await?;

    if args.list_tools {
        let definitions = registry.to_definitions().await;
        println!("{}", serde_json::to_string_pretty(&definitions)?);
        return Ok(());
    }

    let tools = registry.list().await;
    info!(?tools, "starting MCP server on stdio");
    McpServer::new(registry)
        .serve(tokio::io::stdin(), tokio::io::stdout())
        .await?;
    info!("shutting down");
    Ok(())
}

fn report_configuration(config: &GatewayConfig) {
    if config.github_token.is_none() {
        warn!("GITHUB_TOKEN not set; GitHub tools use the unauthenticated rate limit");
    }
    if config.email_webhook_url.is_none() {
        warn!("POWER_AUTOMATE_WEBHOOK_URL not set; send_email will report it is not configured");
    }
    if config.llm_api_key.is_some() {
        info!("OPENAI_API_KEY is set but no tool in this gateway uses it");
    }
    info!(timeout = ?config.request_timeout, "HTTP request timeout");
}
