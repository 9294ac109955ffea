// ABOUTME: RepoLanguagesTool - language breakdown of a GitHub repository.
// ABOUTME: Converts byte counts into percentages, largest first.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{GithubClient, repo_not_found, repo_path};
use crate::error::ToolError;
use crate::tool::{Tool, ToolResult, parse_params, require_non_empty};

/// Share of a repository written in one language.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageShare {
    pub language: String,
    pub bytes: u64,
    pub percentage: f64,
}

/// Tool for reading repository language statistics.
pub struct RepoLanguagesTool {
    github: Arc<GithubClient>,
}

impl RepoLanguagesTool {
    pub fn new(github: Arc<GithubClient>) -> Self {
        Self { github }
    }
}

#[async_trait]
impl Tool for RepoLanguagesTool {
    fn name(&self) -> &str {
        "github_get_languages"
    }

    fn description(&self) -> &str {
        "Get programming languages used in a GitHub repository, with byte counts and percentages."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "owner": {
                    "type": "string",
                    "description": "Repository owner"
                },
                "repo": {
                    "type": "string",
                    "description": "Repository name"
                }
            },
            "required": ["owner", "repo"]
        })
    }

    async fn invoke(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            owner: String,
            repo: String,
        }

        let params: Params = parse_params(params)?;
        let owner = require_non_empty("owner", &params.owner)?;
        let repo = require_non_empty("repo", &params.repo)?;

        let data: BTreeMap<String, u64> = self
            .github
            .get_json(
                &repo_path(&owner, &repo, "/languages"),
                &[],
                repo_not_found(&owner, &repo),
            )
            .await?;

        let total_bytes: u64 = data.values().sum();
        let languages = language_shares(data);
        let language_count = languages.len();

        Ok(ToolResult::success(json!(languages))
            .with_detail("owner", owner)
            .with_detail("repo", repo)
            .with_detail("total_bytes", total_bytes)
            .with_detail("language_count", language_count))
    }
}

/// Sort by bytes descending (name breaks ties) and round percentages to 2 places.
pub fn language_shares(bytes_by_language: BTreeMap<String, u64>) -> Vec<LanguageShare> {
    let total: u64 = bytes_by_language.values().sum();
    let mut shares: Vec<_> = bytes_by_language
        .into_iter()
        .map(|(language, bytes)| {
            let percentage = if total > 0 {
                (bytes as f64 / total as f64 * 10_000.0).round() / 100.0
            } else {
                0.0
            };
            LanguageShare {
                language,
                bytes,
                percentage,
            }
        })
        .collect();
    // BTreeMap iteration is name-ordered and sort_by is stable.
    shares.sort_by(|a, b| b.bytes.cmp(&a.bytes));
    shares
}
