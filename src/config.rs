// ABOUTME: Gateway configuration - credentials, upstream endpoints, timeout.
// ABOUTME: Built once at startup and passed explicitly to tool constructors.

use std::fmt;
use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_WEATHER_API_URL: &str = "https://api.weather.gov";
pub const DEFAULT_ZIP_LOOKUP_URL: &str = "https://api.zippopotam.us";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Process-wide settings consumed by the tools.
#[derive(Clone)]
pub struct GatewayConfig {
    /// Bearer token for the GitHub tool family. Absent means unauthenticated.
    pub github_token: Option<String>,
    /// Webhook the email tool posts to.
    pub email_webhook_url: Option<String>,
    /// Credential for the external orchestrator's LLM. Not used by the tools.
    pub llm_api_key: Option<String>,
    /// Bound applied to every outbound request.
    pub request_timeout: Duration,
    pub github_api_url: String,
    pub weather_api_url: String,
    pub zip_lookup_url: String,
    pub user_agent: String,
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("github_token", &redact(&self.github_token))
            .field("email_webhook_url", &redact(&self.email_webhook_url))
            .field("llm_api_key", &redact(&self.llm_api_key))
            .field("request_timeout", &self.request_timeout)
            .field("github_api_url", &self.github_api_url)
            .field("weather_api_url", &self.weather_api_url)
            .field("zip_lookup_url", &self.zip_lookup_url)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

/// Debug stand-in for a secret: shows presence, never the value.
pub(crate) fn redact(secret: &Option<String>) -> Option<&'static str> {
    secret.as_ref().map(|_| "<redacted>")
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            email_webhook_url: None,
            llm_api_key: None,
            request_timeout: DEFAULT_TIMEOUT,
            github_api_url: DEFAULT_GITHUB_API_URL.to_string(),
            weather_api_url: DEFAULT_WEATHER_API_URL.to_string(),
            zip_lookup_url: DEFAULT_ZIP_LOOKUP_URL.to_string(),
            user_agent: concat!("mcp-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl GatewayConfig {
    /// Create a config with defaults and no credentials.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through an arbitrary key lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut config = Self {
            github_token: get("GITHUB_TOKEN"),
            email_webhook_url: get("POWER_AUTOMATE_WEBHOOK_URL"),
            llm_api_key: get("OPENAI_API_KEY"),
            ..Self::default()
        };

        if let Some(secs) = get("GATEWAY_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.parse().map_err(|_| ConfigError::Invalid {
                key: "GATEWAY_REQUEST_TIMEOUT_SECS",
                reason: format!("expected a whole number of seconds, got {secs:?}"),
            })?;
            config = config.with_timeout(Duration::from_secs(secs))?;
        }
        if let Some(url) = get("GITHUB_API_URL") {
            config.github_api_url = url;
        }
        if let Some(url) = get("WEATHER_API_URL") {
            config.weather_api_url = url;
        }
        if let Some(url) = get("ZIP_LOOKUP_URL") {
            config.zip_lookup_url = url;
        }
        if let Some(agent) = get("GATEWAY_USER_AGENT") {
            config.user_agent = agent;
        }

        Ok(config)
    }

    /// Set the GitHub bearer token.
    pub fn with_github_token(mut self, token: impl Into<String>) -> Self {
        self.github_token = Some(token.into());
        self
    }

    /// Set the email webhook URL.
    pub fn with_email_webhook(mut self, url: impl Into<String>) -> Self {
        self.email_webhook_url = Some(url.into());
        self
    }

    /// Set the request timeout. Zero is rejected.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        if timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "request_timeout",
                reason: "timeout must be greater than zero".into(),
            });
        }
        self.request_timeout = timeout;
        Ok(self)
    }

    /// Point every upstream at one base URL. Used to aim the tools at a stub server.
    pub fn with_base_url(mut self, base: impl Into<String>) -> Self {
        let base = base.into();
        self.github_api_url = base.clone();
        self.weather_api_url = base.clone();
        self.zip_lookup_url = base;
        self
    }
}
