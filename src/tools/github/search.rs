// ABOUTME: SearchReposTool - searches GitHub repositories by query.
// ABOUTME: Results are sorted by stars and trimmed to max_results.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::client::GithubClient;
use super::models::SearchResponse;
use crate::error::ToolError;
use crate::tool::{Tool, ToolResult, parse_params, require_non_empty, require_range};

/// Larger requests are clamped to one page of this size.
const MAX_PER_PAGE: u32 = 30;

/// Tool for searching GitHub repositories.
pub struct SearchReposTool {
    github: Arc<GithubClient>,
}

impl SearchReposTool {
    pub fn new(github: Arc<GithubClient>) -> Self {
        Self { github }
    }
}

#[async_trait]
impl Tool for SearchReposTool {
    fn name(&self) -> &str {
        "github_search_repositories"
    }

    fn description(&self) -> &str {
        "Search for GitHub repositories. Returns matching repositories sorted by stars."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query (e.g., \"machine learning python\")"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 5, capped at 30)",
                    "default": 5,
                    "minimum": 1
                }
            },
            "required": ["query"]
        })
    }

    async fn invoke(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            query: String,
            #[serde(default = "default_max_results")]
            max_results: u32,
        }

        fn default_max_results() -> u32 {
            5
        }

        let params: Params = parse_params(params)?;
        let query = require_non_empty("query", &params.query)?;
        let max_results = require_range(
            "max_results",
            params.max_results.min(MAX_PER_PAGE),
            MAX_PER_PAGE,
        )?;

        let data: SearchResponse = self
            .github
            .get_json(
                "/search/repositories",
                &[
                    ("q", query.clone()),
                    ("per_page", max_results.to_string()),
                    ("sort", "stars".to_string()),
                ],
                || "Search endpoint not found".to_string(),
            )
            .await?;

        let results: Vec<_> = data
            .items
            .into_iter()
            .take(max_results as usize)
            .map(|item| {
                json!({
                    "name": item.name,
                    "full_name": item.full_name,
                    "description": item.description.as_deref().unwrap_or("No description"),
                    "stars": item.stargazers_count,
                    "language": item.language.as_deref().unwrap_or("Unknown"),
                    "html_url": item.html_url,
                })
            })
            .collect();
        let returned = results.len();

        Ok(ToolResult::success(results)
            .with_detail("query", query)
            .with_detail("total_count", data.total_count)
            .with_detail("returned", returned))
    }
}
