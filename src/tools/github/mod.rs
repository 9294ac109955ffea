// ABOUTME: GitHub tool family - repository info, search, issues, languages.
// ABOUTME: All four tools share one GithubClient and its optional token.

mod client;
mod issues;
mod languages;
mod models;
mod repo_info;
mod search;

pub use client::GithubClient;
pub use issues::ListIssuesTool;
pub use languages::{LanguageShare, RepoLanguagesTool, language_shares};
pub use repo_info::RepoInfoTool;
pub use search::SearchReposTool;
