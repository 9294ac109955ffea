// ABOUTME: RepoInfoTool - fetches metadata for a single GitHub repository.
// ABOUTME: Maps GET /repos/{owner}/{repo} to a compact summary.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::client::{GithubClient, repo_not_found, repo_path};
use super::models::Repository;
use crate::error::ToolError;
use crate::tool::{Tool, ToolResult, parse_params, require_non_empty};

/// Tool for reading repository information.
pub struct RepoInfoTool {
    github: Arc<GithubClient>,
}

impl RepoInfoTool {
    pub fn new(github: Arc<GithubClient>) -> Self {
        Self { github }
    }
}

#[async_trait]
impl Tool for RepoInfoTool {
    fn name(&self) -> &str {
        "github_get_repo_info"
    }

    fn description(&self) -> &str {
        "Get information about a GitHub repository including stars, forks, description, language, and license."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "owner": {
                    "type": "string",
                    "description": "Repository owner (username or organization)"
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

        let data: Repository = self
            .github
            .get_json(&repo_path(&owner, &repo, ""), &[], repo_not_found(&owner, &repo))
            .await?;

        let description = data.description_or_default().to_string();
        let language = data.language_or_default().to_string();
        let full_name = data.full_name.unwrap_or_else(|| format!("{owner}/{repo}"));
        let login = data.owner.map_or_else(|| owner.clone(), |o| o.login);
        Ok(ToolResult::success(json!({
            "name": data.name,
            "full_name": full_name,
            "description": description,
            "owner": login,
            "stars": data.stargazers_count,
            "forks": data.forks_count,
            "open_issues": data.open_issues_count,
            "language": language,
            "default_branch": data.default_branch,
            "created_at": data.created_at,
            "updated_at": data.updated_at,
            "topics": data.topics,
            "license": data.license.map(|l| l.name),
            "homepage": data.homepage,
            "html_url": data.html_url,
        }))
        .with_detail("owner", owner)
        .with_detail("repo", repo))
    }
}
