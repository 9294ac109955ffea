// ABOUTME: GithubClient - shared HTTP access for the GitHub tool family.
// ABOUTME: Applies API headers and the optional bearer token to every request.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::config::{GatewayConfig, redact};
use crate::error::{ConfigError, ToolError};
use crate::http;

pub(crate) const SERVICE: &str = "GitHub API";
const API_VERSION: &str = "2022-11-28";

/// HTTP client for the GitHub REST API.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GithubClient")
            .field("base_url", &self.base_url)
            .field("token", &redact(&self.token))
            .finish_non_exhaustive()
    }
}

impl GithubClient {
    /// Create a client from the gateway configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            http: http::build_client(config)?,
            base_url: config.github_api_url.trim_end_matches('/').to_string(),
            token: config.github_token.clone(),
        })
    }

    /// Returns true if requests carry a bearer token.
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// GET a JSON document.
    ///
    /// A 404 becomes `ToolError::NotFound` with the given message.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        not_found: impl FnOnce() -> String,
    ) -> Result<T, ToolError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%url, authenticated = self.is_authenticated(), "GitHub request");

        let mut request = self
            .http
            .get(&url)
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        http::fetch_json(SERVICE, request, not_found, self.rate_limit_advice()).await
    }

    fn rate_limit_advice(&self) -> &'static str {
        if self.is_authenticated() {
            ""
        } else {
            "Set GITHUB_TOKEN to increase limits."
        }
    }
}

/// Path of a repository resource, with owner and name escaped.
pub(crate) fn repo_path(owner: &str, repo: &str, suffix: &str) -> String {
    format!(
        "/repos/{}/{}{}",
        urlencoding::encode(owner),
        urlencoding::encode(repo),
        suffix
    )
}

pub(crate) fn repo_not_found(owner: &str, repo: &str) -> impl FnOnce() -> String {
    let full = format!("{owner}/{repo}");
    move || format!("Repository {full} not found")
}
