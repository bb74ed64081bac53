use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{parse_args, Tool, ToolError};
use crate::github::client::{GitHubClient, GitHubError};
use crate::github::reference::{parse_issue_reference, parse_pr_reference};
use crate::github::types::NewPullRequest;

/// Every GitHub REST tool exposed to the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitHubToolKind {
    FetchIssue,
    FetchPrDetails,
    FetchPrReviews,
    FetchPrReviewComments,
    FetchPrConversation,
    GetRepoInfo,
    CreatePullRequest,
}

impl GitHubToolKind {
    pub const ALL: [GitHubToolKind; 7] = [
        GitHubToolKind::FetchIssue,
        GitHubToolKind::FetchPrDetails,
        GitHubToolKind::FetchPrReviews,
        GitHubToolKind::FetchPrReviewComments,
        GitHubToolKind::FetchPrConversation,
        GitHubToolKind::GetRepoInfo,
        GitHubToolKind::CreatePullRequest,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GitHubToolKind::FetchIssue => "fetch_issue",
            GitHubToolKind::FetchPrDetails => "fetch_pr_details",
            GitHubToolKind::FetchPrReviews => "fetch_pr_reviews",
            GitHubToolKind::FetchPrReviewComments => "fetch_pr_review_comments",
            GitHubToolKind::FetchPrConversation => "fetch_pr_conversation",
            GitHubToolKind::GetRepoInfo => "get_repo_info",
            GitHubToolKind::CreatePullRequest => "create_pull_request",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GitHubToolKind::FetchIssue => "Fetch a GitHub issue and its comments.",
            GitHubToolKind::FetchPrDetails => "Fetch a pull request's title, body, branches and size.",
            GitHubToolKind::FetchPrReviews => "Fetch the reviews submitted on a pull request.",
            GitHubToolKind::FetchPrReviewComments => {
                "Fetch inline review comments on a pull request's diff."
            }
            GitHubToolKind::FetchPrConversation => {
                "Fetch the top-level conversation comments on a pull request."
            }
            GitHubToolKind::GetRepoInfo => {
                "Fetch repository metadata such as the default branch and clone URL."
            }
            GitHubToolKind::CreatePullRequest => "Open a pull request from head into base.",
        }
    }

    pub fn schema(self) -> Value {
        let pr_url = json!({
            "type": "object",
            "properties": {
                "pr_url": {"type": "string", "description": "https://github.com/owner/repo/pull/123"}
            },
            "required": ["pr_url"]
        });

        match self {
            GitHubToolKind::FetchIssue => json!({
                "type": "object",
                "properties": {
                    "issue": {"type": "string", "description": "https://github.com/owner/repo/issues/123 or owner/repo#123"}
                },
                "required": ["issue"]
            }),
            GitHubToolKind::FetchPrDetails
            | GitHubToolKind::FetchPrReviews
            | GitHubToolKind::FetchPrReviewComments
            | GitHubToolKind::FetchPrConversation => pr_url,
            GitHubToolKind::GetRepoInfo => json!({
                "type": "object",
                "properties": {
                    "owner": {"type": "string"},
                    "repo": {"type": "string"}
                },
                "required": ["owner", "repo"]
            }),
            GitHubToolKind::CreatePullRequest => json!({
                "type": "object",
                "properties": {
                    "owner": {"type": "string"},
                    "repo": {"type": "string"},
                    "title": {"type": "string"},
                    "body": {"type": "string"},
                    "head": {"type": "string", "description": "Branch containing the changes"},
                    "base": {"type": "string", "description": "Branch to merge into"}
                },
                "required": ["owner", "repo", "title", "body", "head", "base"]
            }),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IssueArgs {
    issue: String,
}

#[derive(Debug, Deserialize)]
struct PrArgs {
    pr_url: String,
}

#[derive(Debug, Deserialize)]
struct RepoArgs {
    owner: String,
    repo: String,
}

#[derive(Debug, Deserialize)]
struct CreatePrArgs {
    owner: String,
    repo: String,
    #[serde(flatten)]
    pull_request: NewPullRequest,
}

/// Render a GitHub call for the model: JSON on success, error text otherwise
fn render<T: Serialize>(result: Result<T, GitHubError>) -> String {
    match result {
        Ok(value) => serde_json::to_string_pretty(&value)
            .unwrap_or_else(|e| format!("Error: Failed to serialize result: {}", e)),
        Err(e) => format!("Error: {}", e),
    }
}

/// A GitHub REST tool backed by a shared [`GitHubClient`]
pub struct GitHubTool {
    kind: GitHubToolKind,
    client: Arc<GitHubClient>,
}

impl GitHubTool {
    pub fn new(kind: GitHubToolKind, client: Arc<GitHubClient>) -> Self {
        Self { kind, client }
    }

    pub fn all(client: Arc<GitHubClient>) -> Vec<GitHubTool> {
        GitHubToolKind::ALL
            .iter()
            .map(|kind| GitHubTool::new(*kind, Arc::clone(&client)))
            .collect()
    }
}

#[async_trait]
impl Tool for GitHubTool {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn description(&self) -> &'static str {
        self.kind.description()
    }

    fn parameters(&self) -> Value {
        self.kind.schema()
    }

    async fn execute(&self, args: Value) -> Result<String, ToolError> {
        let name = self.name();
        let client = &self.client;

        let output = match self.kind {
            GitHubToolKind::FetchIssue => {
                let a: IssueArgs = parse_args(name, args)?;
                let reference = parse_issue_reference(&a.issue)?;
                render(client.fetch_issue(&reference).await)
            }
            GitHubToolKind::FetchPrDetails => {
                let a: PrArgs = parse_args(name, args)?;
                let reference = parse_pr_reference(&a.pr_url)?;
                render(client.fetch_pr_details(&reference).await)
            }
            GitHubToolKind::FetchPrReviews => {
                let a: PrArgs = parse_args(name, args)?;
                let reference = parse_pr_reference(&a.pr_url)?;
                render(client.fetch_pr_reviews(&reference).await)
            }
            GitHubToolKind::FetchPrReviewComments => {
                let a: PrArgs = parse_args(name, args)?;
                let reference = parse_pr_reference(&a.pr_url)?;
                render(client.fetch_pr_review_comments(&reference).await)
            }
            GitHubToolKind::FetchPrConversation => {
                let a: PrArgs = parse_args(name, args)?;
                let reference = parse_pr_reference(&a.pr_url)?;
                render(client.fetch_pr_conversation(&reference).await)
            }
            GitHubToolKind::GetRepoInfo => {
                let a: RepoArgs = parse_args(name, args)?;
                render(client.get_repo_info(&a.owner, &a.repo).await)
            }
            GitHubToolKind::CreatePullRequest => {
                let a: CreatePrArgs = parse_args(name, args)?;
                match client.create_pull_request(&a.owner, &a.repo, &a.pull_request).await {
                    Ok(created) => render(Ok(created)),
                    // Provider's body passes through untouched
                    Err(GitHubError::Api { body, .. }) => {
                        format!("Error creating pull request: {}", body)
                    }
                    Err(e) => format!("Error creating pull request: {}", e),
                }
            }
        };

        Ok(output)
    }
}
