use crate::github::reference::{IssueReference, PrReference};
use crate::github::types::{
    ApiComment, ApiCreatedPullRequest, ApiIssue, ApiPullRequest, ApiRepository, ApiReview,
    ApiReviewComment, Comment, CreatedPullRequest, IssueDetails, NewPullRequest,
    PullRequestDetails, RepoInfo, Review, ReviewComment,
};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT as USER_AGENT_HEADER};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// GitHub REST API base URL
pub const GITHUB_API_BASE: &str = "https://api.github.com";

/// User-Agent sent with every request
pub const USER_AGENT: &str = "issuesmith";

const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// Errors that can occur talking to the GitHub API
#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-2xx response; `body` is the provider's text, unmodified
    #[error("GitHub API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Unexpected response from GitHub: {0}")]
    InvalidResponse(#[from] serde_json::Error),
}

/// Authenticated client for the handful of REST endpoints the agent needs
///
/// One request per call, no retries; failures go straight back to the caller.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    http_client: Client,
    api_base: String,
    token: String,
    user_agent: String,
}

impl GitHubClient {
    pub fn new(token: impl Into<String>) -> Result<Self, GitHubError> {
        let http_client = Client::builder().timeout(Duration::from_secs(60)).build()?;

        Ok(Self {
            http_client,
            api_base: GITHUB_API_BASE.to_string(),
            token: token.into(),
            user_agent: USER_AGENT.to_string(),
        })
    }

    /// Point the client at a different API root (GitHub Enterprise, tests)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        debug!(%method, %url, "GitHub request");

        self.http_client
            .request(method, url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token))
            .header(ACCEPT, ACCEPT_V3)
            .header(USER_AGENT_HEADER, &self.user_agent)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, GitHubError> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(GitHubError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, GitHubError> {
        self.send(self.request(Method::GET, path)).await
    }

    /// Issue plus its comments; a failed comments call yields no comments
    pub async fn fetch_issue(&self, reference: &IssueReference) -> Result<IssueDetails, GitHubError> {
        let base = format!(
            "/repos/{}/{}/issues/{}",
            reference.owner, reference.repo, reference.number
        );
        let issue: ApiIssue = self.get(&base).await?;

        let comments = match self.get::<Vec<ApiComment>>(&format!("{}/comments", base)).await {
            Ok(comments) => comments.into_iter().map(Comment::from).collect(),
            Err(e) => {
                warn!(issue = %reference, error = %e, "failed to fetch issue comments");
                Vec::new()
            }
        };

        Ok(IssueDetails::from_api(issue, comments))
    }

    pub async fn fetch_pr_details(
        &self,
        reference: &PrReference,
    ) -> Result<PullRequestDetails, GitHubError> {
        let pr: ApiPullRequest = self
            .get(&format!(
                "/repos/{}/{}/pulls/{}",
                reference.owner, reference.repo, reference.number
            ))
            .await?;
        Ok(pr.into())
    }

    pub async fn fetch_pr_reviews(&self, reference: &PrReference) -> Result<Vec<Review>, GitHubError> {
        let reviews: Vec<ApiReview> = self
            .get(&format!(
                "/repos/{}/{}/pulls/{}/reviews",
                reference.owner, reference.repo, reference.number
            ))
            .await?;
        Ok(reviews.into_iter().map(Review::from).collect())
    }

    /// Inline diff comments
    pub async fn fetch_pr_review_comments(
        &self,
        reference: &PrReference,
    ) -> Result<Vec<ReviewComment>, GitHubError> {
        let comments: Vec<ApiReviewComment> = self
            .get(&format!(
                "/repos/{}/{}/pulls/{}/comments",
                reference.owner, reference.repo, reference.number
            ))
            .await?;
        Ok(comments.into_iter().map(ReviewComment::from).collect())
    }

    /// Top-level PR conversation, served by the issues comments endpoint
    pub async fn fetch_pr_conversation(
        &self,
        reference: &PrReference,
    ) -> Result<Vec<Comment>, GitHubError> {
        let comments: Vec<ApiComment> = self
            .get(&format!(
                "/repos/{}/{}/issues/{}/comments",
                reference.owner, reference.repo, reference.number
            ))
            .await?;
        Ok(comments.into_iter().map(Comment::from).collect())
    }

    pub async fn get_repo_info(&self, owner: &str, repo: &str) -> Result<RepoInfo, GitHubError> {
        let repository: ApiRepository = self.get(&format!("/repos/{}/{}", owner, repo)).await?;
        Ok(repository.into())
    }

    pub async fn create_pull_request(
        &self,
        owner: &str,
        repo: &str,
        pull_request: &NewPullRequest,
    ) -> Result<CreatedPullRequest, GitHubError> {
        let request = self
            .request(Method::POST, &format!("/repos/{}/{}/pulls", owner, repo))
            .json(pull_request);
        let created: ApiCreatedPullRequest = self.send(request).await?;
        Ok(created.into())
    }
}
