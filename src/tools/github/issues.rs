// ABOUTME: ListIssuesTool - lists issues of a GitHub repository.
// ABOUTME: Supports state and label filters; pull requests are skipped.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use super::client::{GithubClient, repo_not_found, repo_path};
use super::models::Issue;
use crate::error::ToolError;
use crate::tool::{Tool, ToolResult, parse_params, require_non_empty, require_range};

const MAX_PER_PAGE: u32 = 30;
const STATES: [&str; 3] = ["open", "closed", "all"];

/// Tool for listing repository issues.
pub struct ListIssuesTool {
    github: Arc<GithubClient>,
}

impl ListIssuesTool {
    pub fn new(github: Arc<GithubClient>) -> Self {
        Self { github }
    }
}

#[async_trait]
impl Tool for ListIssuesTool {
    fn name(&self) -> &str {
        "github_get_issues"
    }

    fn description(&self) -> &str {
        "List issues for a GitHub repository, optionally filtered by state and labels. Pull requests are excluded."
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
                },
                "state": {
                    "type": "string",
                    "enum": STATES,
                    "description": "Issue state - 'open', 'closed', or 'all' (default: 'open')",
                    "default": "open"
                },
                "labels": {
                    "type": "string",
                    "description": "Comma-separated label names; only issues carrying all of them are returned"
                },
                "max_results": {
                    "type": "integer",
                    "description": "Maximum number of results to return (default: 10, capped at 30)",
                    "default": 10,
                    "minimum": 1
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
            #[serde(default = "default_state")]
            state: String,
            #[serde(default)]
            labels: Option<String>,
            #[serde(default = "default_max_results")]
            max_results: u32,
        }

        fn default_state() -> String {
            "open".to_string()
        }
        fn default_max_results() -> u32 {
            10
        }

        let params: Params = parse_params(params)?;
        let owner = require_non_empty("owner", &params.owner)?;
        let repo = require_non_empty("repo", &params.repo)?;
        let state = params.state.trim().to_ascii_lowercase();
        if !STATES.contains(&state.as_str()) {
            return Err(ToolError::InvalidParams(format!(
                "`state` must be one of open, closed, all; got {:?}",
                params.state
            )));
        }
        let max_results = require_range(
            "max_results",
            params.max_results.min(MAX_PER_PAGE),
            MAX_PER_PAGE,
        )?;

        let mut query = vec![
            ("state", state.clone()),
            ("per_page", max_results.to_string()),
        ];
        let labels = params
            .labels
            .map(|l| normalize_labels(&l))
            .filter(|l| !l.is_empty());
        if let Some(labels) = &labels {
            query.push(("labels", labels.clone()));
        }

        let data: Vec<Issue> = self
            .github
            .get_json(
                &repo_path(&owner, &repo, "/issues"),
                &query,
                repo_not_found(&owner, &repo),
            )
            .await?;

        let issues: Vec<_> = data
            .into_iter()
            .take(max_results as usize)
            .filter(|issue| !issue.is_pull_request())
            .map(|issue| {
                json!({
                    "number": issue.number,
                    "title": issue.title,
                    "state": issue.state,
                    "author": issue.user.map(|u| u.login),
                    "labels": issue.labels.into_iter().map(|l| l.name).collect::<Vec<_>>(),
                    "created_at": issue.created_at,
                    "updated_at": issue.updated_at,
                    "comments": issue.comments,
                    "html_url": issue.html_url,
                })
            })
            .collect();
        let count = issues.len();

        let mut result = ToolResult::success(issues)
            .with_detail("owner", owner)
            .with_detail("repo", repo)
            .with_detail("state", state)
            .with_detail("count", count);
        if let Some(labels) = labels {
            result = result.with_detail("labels", labels);
        }
        Ok(result)
    }
}

/// Trim each label and drop empty entries.
fn normalize_labels(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;

    use super::*;
    use crate::config::GatewayConfig;

    fn tool_for(server: &MockServer) -> ListIssuesTool {
        let config = GatewayConfig::new().with_base_url(server.base_url());
        ListIssuesTool::new(Arc::new(GithubClient::new(&config).unwrap()))
    }

    fn issue(number: u64, title: &str, label: &str) -> serde_json::Value {
        json!({
            "number": number,
            "title": title,
            "state": "open",
            "user": {"login": format!("user{number}")},
            "labels": [{"name": label}],
            "created_at": "2023-01-01T00:00:00Z",
            "updated_at": "2023-01-02T00:00:00Z",
            "comments": 5,
            "html_url": format!("https://github.com/owner/repo/issues/{number}")
        })
    }

    #[tokio::test]
    async fn test_list_issues_success() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/owner/repo/issues")
                    .query_param("state", "open")
                    .query_param("per_page", "10");
                then.status(200).json_body(json!([
                    issue(1, "Bug report", "bug"),
                    issue(2, "Feature request", "enhancement")
                ]));
            })
            .await;

        let result = tool_for(&server)
            .execute(json!({"owner": "owner", "repo": "repo", "state": "open"}))
            .await;

        mock.assert_async().await;
        assert!(result.is_success());
        let issues = result.result().unwrap().as_array().unwrap();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0]["title"], "Bug report");
        assert_eq!(issues[0]["author"], "user1");
        assert_eq!(issues[0]["labels"], json!(["bug"]));
        assert_eq!(result.details["count"], 2);
        assert_eq!(result.details["state"], "open");
    }

    #[tokio::test]
    async fn test_list_issues_skips_pull_requests() {
        let server = MockServer::start_async().await;
        let mut pr = issue(3, "Add feature", "enhancement");
        pr["pull_request"] = json!({"url": "https://api.github.com/repos/owner/repo/pulls/3"});
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/owner/repo/issues");
                then.status(200)
                    .json_body(json!([issue(1, "Bug report", "bug"), pr.clone()]));
            })
            .await;

        let result = tool_for(&server)
            .execute(json!({"owner": "owner", "repo": "repo"}))
            .await;

        let issues = result.result().unwrap().as_array().unwrap();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0]["number"], 1);
        assert_eq!(result.details["count"], 1);
    }

    #[tokio::test]
    async fn test_list_issues_passes_label_filter() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/owner/repo/issues")
                    .query_param("state", "closed")
                    .query_param("labels", "bug,help wanted");
                then.status(200).json_body(json!([issue(7, "Crash", "bug")]));
            })
            .await;

        let result = tool_for(&server)
            .execute(json!({
                "owner": "owner",
                "repo": "repo",
                "state": "CLOSED",
                "labels": " bug , help wanted,"
            }))
            .await;

        mock.assert_async().await;
        assert!(result.is_success());
        assert_eq!(result.details["labels"], "bug,help wanted");
    }

    #[tokio::test]
    async fn test_list_issues_repo_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/ghost/missing/issues");
                then.status(404);
            })
            .await;

        let result = tool_for(&server)
            .execute(json!({"owner": "ghost", "repo": "missing"}))
            .await;

        assert_eq!(result.error(), Some("Repository ghost/missing not found"));
    }

    #[tokio::test]
    async fn test_list_issues_rejects_unknown_state() {
        let tool = ListIssuesTool::new(Arc::new(GithubClient::new(&GatewayConfig::new()).unwrap()));
        let result = tool
            .execute(json!({"owner": "o", "repo": "r", "state": "merged"}))
            .await;

        assert_eq!(result.details["kind"], "invalid_params");
        assert!(result.error().unwrap().contains("merged"));
    }

    #[test]
    fn test_normalize_labels() {
        assert_eq!(normalize_labels(" a, b ,,c "), "a,b,c");
        assert_eq!(normalize_labels(" , "), "");
    }
}
