use std::collections::HashSet;
use thiserror::Error;
use crate::security::{DANGEROUS_SHELL_PATTERNS, PROTECTED_BRANCHES};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyViolation {
    #[error("Pushing directly to protected branch '{0}' is not allowed. Create a feature branch first.")]
    ProtectedBranch(String),

    #[error("Command blocked: contains dangerous pattern '{0}'")]
    DangerousCommand(String),
}

/// Push and shell-command restrictions
///
/// Both lists are plain data so callers can substitute their own policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyPolicy {
    protected_branches: HashSet<String>,
    dangerous_patterns: Vec<String>,
}

impl SafetyPolicy {
    pub fn new<B, P>(protected_branches: B, dangerous_patterns: P) -> Self
    where
        B: IntoIterator,
        B::Item: AsRef<str>,
        P: IntoIterator,
        P::Item: Into<String>,
    {
        let protected_branches = protected_branches
            .into_iter()
            .map(|b| b.as_ref().trim().to_lowercase())
            .filter(|b| !b.is_empty())
            .collect();

        let dangerous_patterns = dangerous_patterns
            .into_iter()
            .map(Into::into)
            .filter(|p: &String| !p.is_empty())
            .collect();

        Self {
            protected_branches,
            dangerous_patterns,
        }
    }

    /// Reject a push when `branch` is on the protected list
    ///
    /// Exact match after lowercasing; `main-fix` or `mainn` pass.
    pub fn check_push_branch(&self, branch: &str) -> Result<(), PolicyViolation> {
        if self.protected_branches.contains(&branch.trim().to_lowercase()) {
            return Err(PolicyViolation::ProtectedBranch(branch.to_string()));
        }
        Ok(())
    }

    /// Reject a shell command containing any dangerous substring
    pub fn check_shell_command(&self, command: &str) -> Result<(), PolicyViolation> {
        for pattern in &self.dangerous_patterns {
            if command.contains(pattern.as_str()) {
                return Err(PolicyViolation::DangerousCommand(pattern.clone()));
            }
        }
        Ok(())
    }

    pub fn is_protected(&self, branch: &str) -> bool {
        self.check_push_branch(branch).is_err()
    }

    pub fn protected_branches(&self) -> impl Iterator<Item = &str> {
        self.protected_branches.iter().map(String::as_str)
    }

    pub fn dangerous_patterns(&self) -> &[String] {
        &self.dangerous_patterns
    }
}

impl Default for SafetyPolicy {
    fn default() -> Self {
        Self::new(
            PROTECTED_BRANCHES.iter().copied(),
            DANGEROUS_SHELL_PATTERNS.iter().copied(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_branches_rejected() {
        let policy = SafetyPolicy::default();
        for branch in ["main", "master", "develop", "production"] {
            assert!(
                matches!(policy.check_push_branch(branch), Err(PolicyViolation::ProtectedBranch(_))),
                "Branch should be protected: {}",
                branch
            );
        }
    }

    #[test]
    fn test_protected_check_is_case_insensitive() {
        let policy = SafetyPolicy::default();
        assert!(policy.is_protected("MAIN"));
        assert!(policy.is_protected("Master"));
        assert!(policy.is_protected("Production"));
    }

    #[test]
    fn test_feature_branches_allowed() {
        let policy = SafetyPolicy::default();
        assert!(policy.check_push_branch("fix/issue-7").is_ok());
        assert!(policy.check_push_branch("feature/main-menu").is_ok());
        // Blocklist, not allowlist: near-misses pass
        assert!(policy.check_push_branch("mainn").is_ok());
        assert!(policy.check_push_branch("main-fix").is_ok());
    }

    #[test]
    fn test_dangerous_shell_rejected() {
        let policy = SafetyPolicy::default();

        let result = policy.check_shell_command("sudo apt-get install foo");
        assert_eq!(result, Err(PolicyViolation::DangerousCommand("sudo".to_string())));

        assert!(policy.check_shell_command("cd / && rm -rf / --no-preserve-root").is_err());
        assert!(policy.check_shell_command("dd if=/dev/zero of=/dev/sda").is_err());
        assert!(policy.check_shell_command("git push origin main").is_err());
    }

    #[test]
    fn test_ordinary_shell_allowed() {
        let policy = SafetyPolicy::default();
        assert!(policy.check_shell_command("cargo test --all").is_ok());
        assert!(policy.check_shell_command("ls -la src").is_ok());
        assert!(policy.check_shell_command("rm -rf target/debug").is_ok());
    }

    #[test]
    fn test_custom_policy() {
        let policy = SafetyPolicy::new(["release"], ["curl"]);

        assert!(policy.is_protected("Release"));
        assert!(!policy.is_protected("main"));
        assert!(policy.check_shell_command("curl example.com").is_err());
        assert!(policy.check_shell_command("sudo ls").is_ok());
    }

    #[test]
    fn test_empty_entries_ignored() {
        let policy = SafetyPolicy::new(["", "  "], [""]);
        assert_eq!(policy.protected_branches().count(), 0);
        assert!(policy.dangerous_patterns().is_empty());
        assert!(policy.check_shell_command("anything").is_ok());
    }
}
