// ABOUTME: Built-in gateway tools wrapping external HTTP APIs.
// ABOUTME: GitHub, weather.gov forecasts, webhook email, plus local math tools.

mod analyzer;
mod calculator;
mod email;
pub mod github;
mod weather;

pub use analyzer::{AnalysisKind, AnalyzeDataTool, MAX_DATA_POINTS, Statistics};
pub use calculator::{CalculateTool, MAX_EXPRESSION_CHARS, evaluate};
pub use email::{MAX_BODY_CHARS, MAX_SUBJECT_CHARS, SendEmailTool, validate_email};
pub use github::{
    GithubClient, LanguageShare, ListIssuesTool, RepoInfoTool, RepoLanguagesTool,
    SearchReposTool,
};
pub use weather::{
    ForecastKind, ForecastPeriod, Location, ResolvedLocation, WeatherForecastTool,
};

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::tool::Registry;

/// Register every built-in tool on `registry`.
///
/// The GitHub tools share one client. Tools whose credentials are missing
/// are still registered and report the problem when called.
pub async fn register_builtin(
    registry: &Registry,
    config: &GatewayConfig,
) -> Result<(), GatewayError> {
    let github = Arc::new(GithubClient::new(config)?);
    if !github.is_authenticated() {
        tracing::debug!("GitHub tools running unauthenticated");
    }

    registry
        .register(RepoInfoTool::new(Arc::clone(&github)))
        .await?;
    registry
        .register(SearchReposTool::new(Arc::clone(&github)))
        .await?;
    registry
        .register(ListIssuesTool::new(Arc::clone(&github)))
        .await?;
    registry.register(RepoLanguagesTool::new(github)).await?;
    registry.register(WeatherForecastTool::new(config)?).await?;
    registry.register(SendEmailTool::new(config)?).await?;
    registry.register(CalculateTool).await?;
    registry.register(AnalyzeDataTool).await?;

    let count = registry.count().await;
    tracing::info!(count, "registered built-in tools");
    Ok(())
}

impl Registry {
    /// Create a registry pre-loaded with the built-in tools.
    pub async fn with_builtin_tools(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let registry = Self::new();
        register_builtin(&registry, config).await?;
        Ok(registry)
    }
}
