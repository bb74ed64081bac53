use crate::git::executor::CommandExecutor;
use serde::Serialize;
use std::path::Path;
use tracing::warn;

/// Outcome of checking a working directory's `origin` remote
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoVerification {
    pub valid: bool,
    pub actual_remote_url: Option<String>,
    pub error: Option<String>,
}

impl RepoVerification {
    fn ok(url: String) -> Self {
        Self {
            valid: true,
            actual_remote_url: Some(url),
            error: None,
        }
    }

    fn mismatch(url: String, expected: &str) -> Self {
        let error = format!(
            "Remote URL '{}' does not match expected repository '{}'",
            url, expected
        );
        Self {
            valid: false,
            actual_remote_url: Some(url),
            error: Some(error),
        }
    }

    fn no_remote(reason: String) -> Self {
        Self {
            valid: false,
            actual_remote_url: None,
            error: Some(reason),
        }
    }
}

/// Loose remote match: `expected` must appear somewhere in the URL
///
/// Tolerates `.git` suffixes, scheme differences and trailing slashes. It also
/// accepts `foo/barbaz` when `foo/bar` is expected.
pub fn remote_matches(actual_url: &str, expected: &str) -> bool {
    actual_url.contains(expected)
}

/// Confirms a directory is a clone of the expected repository
#[derive(Debug, Clone, Default)]
pub struct RepoVerifier {
    executor: CommandExecutor,
}

impl RepoVerifier {
    pub fn new(executor: CommandExecutor) -> Self {
        Self { executor }
    }

    /// Inspect `origin` in `working_dir` and compare it to `expected_repo`
    ///
    /// Without `expected_repo` only the presence of a remote is checked.
    pub async fn verify(&self, working_dir: &Path, expected_repo: Option<&str>) -> RepoVerification {
        let result = self
            .executor
            .git(&["remote", "get-url", "origin"], working_dir)
            .await;

        if !result.success {
            let reason = format!(
                "Could not read origin remote in {}: {}",
                working_dir.display(),
                result.error_text()
            );
            warn!(dir = %working_dir.display(), "repository verification failed: no origin remote");
            return RepoVerification::no_remote(reason);
        }

        let url = result.stdout.trim().to_string();
        match expected_repo {
            Some(expected) if !remote_matches(&url, expected) => {
                warn!(remote = %url, expected, "repository verification failed: remote mismatch");
                RepoVerification::mismatch(url, expected)
            }
            _ => RepoVerification::ok(url),
        }
    }
}
