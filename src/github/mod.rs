pub mod client;
pub mod reference;
pub mod types;

pub use client::{GitHubClient, GitHubError, GITHUB_API_BASE, USER_AGENT};
pub use reference::{parse_issue_reference, parse_pr_reference, IssueReference, PrReference, ReferenceError};
pub use types::{
    Comment, CreatedPullRequest, IssueDetails, NewPullRequest, PullRequestDetails, RepoInfo,
    Review, ReviewComment,
};
