//! GitHub REST payloads and the reduced shapes handed to the agent.
//!
//! `Api*` types mirror only the fields read from GitHub responses. The public
//! types are the stable projections serialized into tool results.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiIssue {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    #[serde(default)]
    pub user: Option<ApiUser>,
    #[serde(default)]
    pub labels: Vec<ApiLabel>,
    pub html_url: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiComment {
    #[serde(default)]
    pub user: Option<ApiUser>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiBranchRef {
    #[serde(rename = "ref")]
    pub ref_name: String,
    pub sha: String,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiPullRequest {
    pub number: u64,
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    #[serde(default)]
    pub user: Option<ApiUser>,
    pub html_url: String,
    pub head: ApiBranchRef,
    pub base: ApiBranchRef,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub merged: bool,
    #[serde(default)]
    pub mergeable: Option<bool>,
    #[serde(default)]
    pub additions: u64,
    #[serde(default)]
    pub deletions: u64,
    #[serde(default)]
    pub changed_files: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiReview {
    #[serde(default)]
    pub user: Option<ApiUser>,
    #[serde(default)]
    pub body: Option<String>,
    pub state: String,
    #[serde(default)]
    pub submitted_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiReviewComment {
    pub id: u64,
    #[serde(default)]
    pub user: Option<ApiUser>,
    #[serde(default)]
    pub body: Option<String>,
    pub path: String,
    #[serde(default)]
    pub line: Option<u64>,
    #[serde(default)]
    pub original_line: Option<u64>,
    #[serde(default)]
    pub diff_hunk: Option<String>,
    #[serde(default)]
    pub in_reply_to_id: Option<u64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiRepository {
    pub full_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub default_branch: String,
    pub html_url: String,
    pub clone_url: String,
    #[serde(default)]
    pub private: bool,
    #[serde(default)]
    pub fork: bool,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub open_issues_count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiCreatedPullRequest {
    pub number: u64,
    pub html_url: String,
    pub title: String,
    pub state: String,
}

fn login(user: Option<ApiUser>) -> String {
    user.map(|u| u.login).unwrap_or_else(|| "ghost".to_string())
}

/// An issue or PR conversation comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    pub author: String,
    pub body: String,
    pub created_at: Option<String>,
}

impl From<ApiComment> for Comment {
    fn from(c: ApiComment) -> Self {
        Self {
            author: login(c.user),
            body: c.body.unwrap_or_default(),
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueDetails {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: String,
    pub author: String,
    pub labels: Vec<String>,
    pub url: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub comments: Vec<Comment>,
}

impl IssueDetails {
    pub(crate) fn from_api(issue: ApiIssue, comments: Vec<Comment>) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            state: issue.state,
            author: login(issue.user),
            labels: issue.labels.into_iter().map(|l| l.name).collect(),
            url: issue.html_url,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
            comments,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestDetails {
    pub number: u64,
    pub title: String,
    pub body: String,
    pub state: String,
    pub author: String,
    pub url: String,
    pub head_branch: String,
    pub head_sha: String,
    pub base_branch: String,
    pub draft: bool,
    pub merged: bool,
    pub mergeable: Option<bool>,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
}

impl From<ApiPullRequest> for PullRequestDetails {
    fn from(pr: ApiPullRequest) -> Self {
        Self {
            number: pr.number,
            title: pr.title,
            body: pr.body.unwrap_or_default(),
            state: pr.state,
            author: login(pr.user),
            url: pr.html_url,
            head_branch: pr.head.ref_name,
            head_sha: pr.head.sha,
            base_branch: pr.base.ref_name,
            draft: pr.draft,
            merged: pr.merged,
            mergeable: pr.mergeable,
            additions: pr.additions,
            deletions: pr.deletions,
            changed_files: pr.changed_files,
        }
    }
}

/// A submitted review (approve, request changes, comment)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Review {
    pub author: String,
    pub state: String,
    pub body: String,
    pub submitted_at: Option<String>,
}

impl From<ApiReview> for Review {
    fn from(r: ApiReview) -> Self {
        Self {
            author: login(r.user),
            state: r.state,
            body: r.body.unwrap_or_default(),
            submitted_at: r.submitted_at,
        }
    }
}

/// An inline comment attached to a line of the diff
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewComment {
    pub id: u64,
    pub author: String,
    pub body: String,
    pub path: String,
    pub line: Option<u64>,
    pub diff_hunk: Option<String>,
    pub in_reply_to_id: Option<u64>,
    pub created_at: Option<String>,
}

impl From<ApiReviewComment> for ReviewComment {
    fn from(c: ApiReviewComment) -> Self {
        Self {
            id: c.id,
            author: login(c.user),
            body: c.body.unwrap_or_default(),
            path: c.path,
            // Outdated comments only carry the original position
            line: c.line.or(c.original_line),
            diff_hunk: c.diff_hunk,
            in_reply_to_id: c.in_reply_to_id,
            created_at: c.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoInfo {
    pub full_name: String,
    pub description: Option<String>,
    pub default_branch: String,
    pub url: String,
    pub clone_url: String,
    pub private: bool,
    pub fork: bool,
    pub language: Option<String>,
    pub open_issues_count: u64,
}

impl From<ApiRepository> for RepoInfo {
    fn from(r: ApiRepository) -> Self {
        Self {
            full_name: r.full_name,
            description: r.description,
            default_branch: r.default_branch,
            url: r.html_url,
            clone_url: r.clone_url,
            private: r.private,
            fork: r.fork,
            language: r.language,
            open_issues_count: r.open_issues_count,
        }
    }
}

/// Request body for `POST /repos/{owner}/{repo}/pulls`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPullRequest {
    pub title: String,
    pub body: String,
    pub head: String,
    pub base: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedPullRequest {
    pub number: u64,
    pub url: String,
    pub title: String,
    pub state: String,
}

impl From<ApiCreatedPullRequest> for CreatedPullRequest {
    fn from(pr: ApiCreatedPullRequest) -> Self {
        Self {
            number: pr.number,
            url: pr.html_url,
            title: pr.title,
            state: pr.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_projection() {
        let raw = json!({
            "number": 42,
            "title": "Widgets crash on empty input",
            "body": null,
            "state": "open",
            "user": {"login": "octocat", "id": 1},
            "labels": [{"name": "bug", "color": "f00"}],
            "html_url": "https://github.com/acme/widgets/issues/42",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-02T00:00:00Z",
            "reactions": {"+1": 3}
        });
        let issue: ApiIssue = serde_json::from_value(raw).unwrap();
        let details = IssueDetails::from_api(issue, Vec::new());

        assert_eq!(details.number, 42);
        assert_eq!(details.body, "");
        assert_eq!(details.author, "octocat");
        assert_eq!(details.labels, vec!["bug".to_string()]);
    }

    #[test]
    fn test_deleted_user_becomes_ghost() {
        let raw = json!({"user": null, "body": "lgtm", "created_at": null});
        let comment: Comment = serde_json::from_value::<ApiComment>(raw).unwrap().into();
        assert_eq!(comment.author, "ghost");
        assert_eq!(comment.body, "lgtm");
    }

    #[test]
    fn test_pull_request_projection() {
        let raw = json!({
            "number": 7,
            "title": "Fix crash",
            "body": "Closes #42",
            "state": "open",
            "user": {"login": "dev"},
            "html_url": "https://github.com/acme/widgets/pull/7",
            "head": {"ref": "fix/issue-42", "sha": "abc123", "label": "dev:fix/issue-42"},
            "base": {"ref": "main", "sha": "def456"},
            "draft": false,
            "merged": false,
            "mergeable": null,
            "additions": 10,
            "deletions": 2,
            "changed_files": 1
        });
        let pr: PullRequestDetails = serde_json::from_value::<ApiPullRequest>(raw).unwrap().into();

        assert_eq!(pr.head_branch, "fix/issue-42");
        assert_eq!(pr.base_branch, "main");
        assert_eq!(pr.mergeable, None);
        assert_eq!(pr.additions, 10);
    }

    #[test]
    fn test_outdated_review_comment_uses_original_line() {
        let raw = json!({
            "id": 5,
            "user": {"login": "reviewer"},
            "body": "nit",
            "path": "src/lib.rs",
            "line": null,
            "original_line": 12
        });
        let comment: ReviewComment = serde_json::from_value::<ApiReviewComment>(raw).unwrap().into();
        assert_eq!(comment.line, Some(12));
        assert_eq!(comment.diff_hunk, None);
    }
}
