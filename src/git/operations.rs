use crate::audit::AuditLogger;
use crate::git::executor::{CommandExecutor, CommandResult};
use crate::git::parser::{parse_current_branch, parse_status_porcelain, GitStatus};
use crate::git::verifier::RepoVerifier;
use crate::security::{PolicyViolation, SafetyPolicy};
use crate::workspace::{detect_test_command, repo_name_from_url, WorkspaceResolver};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

/// Result of a clone request, reported to the caller as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloneOutcome {
    pub success: bool,
    pub already_exists: bool,
    /// Logical name to pass as `repo_path` to later calls
    pub repo_path: String,
    pub local_path: String,
    pub message: String,
}

/// True when a checkout failed because git does not know the ref locally
///
/// Only this failure triggers the tracking-branch fallback. A dirty working
/// tree or a locked index surface their own error instead.
pub fn is_unknown_ref_error(stderr: &str) -> bool {
    let stderr = stderr.to_lowercase();
    stderr.contains("did not match any file(s) known to git")
        || stderr.contains("invalid reference")
        || stderr.contains("unknown revision")
        || stderr.contains("not a commit")
}

/// Render a shell or test run for the caller
pub fn format_command_output(result: &CommandResult) -> String {
    let mut output = format!("Exit code: {}", result.exit_code);

    let stdout = result.stdout.trim_end();
    if !stdout.is_empty() {
        output.push_str("\n\nSTDOUT:\n");
        output.push_str(stdout);
    }

    let stderr = result.stderr.trim_end();
    if !stderr.is_empty() {
        output.push_str("\n\nSTDERR:\n");
        output.push_str(stderr);
    }

    output
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("Error: Failed to serialize result: {}", e))
}

/// Safe git and shell actions against workspace repositories
///
/// Each operation resolves its working directory, optionally verifies the
/// `origin` remote, then runs the command. Every outcome, including failure,
/// comes back as text for the agent; nothing here returns an error.
#[derive(Debug)]
pub struct GitOperations {
    executor: CommandExecutor,
    resolver: WorkspaceResolver,
    verifier: RepoVerifier,
    policy: SafetyPolicy,
    audit: Option<Arc<AuditLogger>>,
}

impl GitOperations {
    pub fn new(resolver: WorkspaceResolver, policy: SafetyPolicy) -> Self {
        let executor = CommandExecutor::new();
        Self {
            verifier: RepoVerifier::new(executor.clone()),
            executor,
            resolver,
            policy,
            audit: None,
        }
    }

    /// Record policy rejections in an audit log
    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Resolve the working directory and, when asked, verify its remote
    async fn target_dir(
        &self,
        repo_path: Option<&str>,
        expected_repo: Option<&str>,
    ) -> Result<PathBuf, String> {
        let dir = self.resolver.resolve(repo_path);
        if !dir.is_dir() {
            return Err(format!(
                "Error: Repository directory not found: {}",
                dir.display()
            ));
        }

        if let Some(expected) = expected_repo {
            let verification = self.verifier.verify(&dir, Some(expected)).await;
            if !verification.valid {
                return Err(format!(
                    "Error: Repository verification failed: {}",
                    verification.error.unwrap_or_default()
                ));
            }
        }

        Ok(dir)
    }

    fn reject(&self, subject: &str, violation: PolicyViolation, dir: &Path) -> String {
        warn!(subject, dir = %dir.display(), reason = %violation, "blocked by safety policy");
        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_policy_rejection(subject, &violation.to_string(), dir) {
                warn!(error = %e, "failed to write audit log");
            }
        }
        format!("Error: {}", violation)
    }

    /// Clone `url` into the workspace, or report that it is already there
    pub async fn clone_repo(
        &self,
        url: &str,
        target_name: Option<&str>,
        branch: Option<&str>,
    ) -> String {
        let name = match target_name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => match repo_name_from_url(url) {
                Some(name) => name,
                None => {
                    return format!("Error: Could not derive a repository name from '{}'", url);
                }
            },
        };

        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return format!("Error: Invalid target directory name '{}'", name);
        }

        let root = self.resolver.workspace_root();
        if let Err(e) = fs::create_dir_all(&root) {
            return format!(
                "Error: Failed to create workspace directory {}: {}",
                root.display(),
                e
            );
        }

        let target = self.resolver.clone_target(&name);
        let local_path = target.display().to_string();

        if target.exists() {
            info!(repo = %name, "clone skipped, directory already exists");
            return to_json(&CloneOutcome {
                success: true,
                already_exists: true,
                repo_path: name.clone(),
                local_path,
                message: format!(
                    "Repository already exists. Use repo_path '{}' for subsequent operations.",
                    name
                ),
            });
        }

        let mut args = vec!["clone"];
        if let Some(branch) = branch.filter(|b| !b.trim().is_empty()) {
            args.extend(["--branch", branch]);
        }
        args.extend([url, local_path.as_str()]);

        let result = self.executor.git(&args, &root).await;
        if !result.success {
            return to_json(&CloneOutcome {
                success: false,
                already_exists: false,
                repo_path: name,
                local_path,
                message: format!("Clone failed: {}", result.error_text()),
            });
        }

        info!(repo = %name, path = %local_path, "cloned repository");
        to_json(&CloneOutcome {
            success: true,
            already_exists: false,
            repo_path: name.clone(),
            local_path,
            message: format!(
                "Cloned successfully. Use repo_path '{}' for subsequent operations.",
                name
            ),
        })
    }

    /// Porcelain status and current branch, queried concurrently
    pub async fn status(&self, repo_path: Option<&str>, expected_repo: Option<&str>) -> String {
        let dir = match self.target_dir(repo_path, expected_repo).await {
            Ok(dir) => dir,
            Err(e) => return e,
        };

        let (porcelain, branch) = tokio::join!(
            self.executor.git(&["status", "--porcelain", "-z"], &dir),
            self.executor.git(&["branch", "--show-current"], &dir),
        );

        if !porcelain.success {
            return format!("Error: {}", porcelain.error_text());
        }

        let branch = if branch.success {
            parse_current_branch(&branch.stdout)
        } else {
            None
        };

        to_json(&GitStatus::new(branch, parse_status_porcelain(&porcelain.stdout)))
    }

    /// Check out `branch`, creating a tracking branch from `origin` if it
    /// only exists remotely
    pub async fn checkout(
        &self,
        branch: &str,
        repo_path: Option<&str>,
        expected_repo: Option<&str>,
    ) -> String {
        let dir = match self.target_dir(repo_path, expected_repo).await {
            Ok(dir) => dir,
            Err(e) => return e,
        };

        let fetch = self.executor.git(&["fetch", "origin"], &dir).await;
        if !fetch.success {
            warn!(error = %fetch.error_text(), "fetch before checkout failed");
        }

        let checkout = self.executor.git(&["checkout", branch], &dir).await;
        if checkout.success {
            return format!("Checked out branch '{}'", branch);
        }

        if !is_unknown_ref_error(&checkout.stderr) {
            return format!(
                "Error: Failed to checkout branch '{}': {}",
                branch,
                checkout.error_text()
            );
        }

        let remote_ref = format!("origin/{}", branch);
        let tracking = self
            .executor
            .git(&["checkout", "-b", branch, "--track", remote_ref.as_str()], &dir)
            .await;

        if tracking.success {
            format!("Created local branch '{}' tracking '{}'", branch, remote_ref)
        } else {
            format!(
                "Error: Failed to checkout branch '{}': {}",
                branch,
                tracking.error_text()
            )
        }
    }

    /// `git checkout -b <name>`; an existing branch is reported as git words it
    pub async fn create_branch(
        &self,
        name: &str,
        repo_path: Option<&str>,
        expected_repo: Option<&str>,
    ) -> String {
        let dir = match self.target_dir(repo_path, expected_repo).await {
            Ok(dir) => dir,
            Err(e) => return e,
        };

        let result = self.executor.git(&["checkout", "-b", name], &dir).await;
        if result.success {
            format!("Created and switched to new branch '{}'", name)
        } else {
            format!("Error: {}", result.error_text())
        }
    }

    /// Stage `files`, or everything when the list is empty
    pub async fn add(
        &self,
        files: &[String],
        repo_path: Option<&str>,
        expected_repo: Option<&str>,
    ) -> String {
        let dir = match self.target_dir(repo_path, expected_repo).await {
            Ok(dir) => dir,
            Err(e) => return e,
        };

        let files: Vec<&str> = if files.is_empty() {
            vec!["."]
        } else {
            files.iter().map(String::as_str).collect()
        };

        let mut args = vec!["add", "--"];
        args.extend(files.iter().copied());

        let result = self.executor.git(&args, &dir).await;
        if result.success {
            format!("Staged: {}", files.join(", "))
        } else {
            format!("Error: {}", result.error_text())
        }
    }

    pub async fn commit(
        &self,
        message: &str,
        repo_path: Option<&str>,
        expected_repo: Option<&str>,
    ) -> String {
        if message.trim().is_empty() {
            return "Error: Commit message must not be empty".to_string();
        }

        let dir = match self.target_dir(repo_path, expected_repo).await {
            Ok(dir) => dir,
            Err(e) => return e,
        };

        let result = self.executor.git(&["commit", "-m", message], &dir).await;
        if result.success {
            result.stdout.trim().to_string()
        } else {
            format!("Error: {}", result.error_text())
        }
    }

    /// Push the current branch to `origin` unless it is protected
    pub async fn push(
        &self,
        repo_path: Option<&str>,
        expected_repo: Option<&str>,
        set_upstream: bool,
    ) -> String {
        let dir = match self.target_dir(repo_path, expected_repo).await {
            Ok(dir) => dir,
            Err(e) => return e,
        };

        let current = self.executor.git(&["branch", "--show-current"], &dir).await;
        if !current.success {
            return format!("Error: Could not determine current branch: {}", current.error_text());
        }

        let Some(branch) = parse_current_branch(&current.stdout) else {
            return "Error: HEAD is detached; check out a branch before pushing".to_string();
        };

        if let Err(violation) = self.policy.check_push_branch(&branch) {
            return self.reject(&format!("push {}", branch), violation, &dir);
        }

        let mut args = vec!["push"];
        if set_upstream {
            args.push("-u");
        }
        args.extend(["origin", branch.as_str()]);

        let result = self.executor.git(&args, &dir).await;
        if !result.success {
            return format!("Error: Push failed: {}", result.error_text());
        }

        info!(branch = %branch, "pushed branch");
        let detail = result.combined_output();
        if detail.is_empty() {
            format!("Pushed branch '{}' to origin", branch)
        } else {
            format!("Pushed branch '{}' to origin\n{}", branch, detail)
        }
    }

    pub async fn diff(
        &self,
        repo_path: Option<&str>,
        expected_repo: Option<&str>,
        staged: bool,
    ) -> String {
        let dir = match self.target_dir(repo_path, expected_repo).await {
            Ok(dir) => dir,
            Err(e) => return e,
        };

        let mut args = vec!["diff"];
        if staged {
            args.push("--staged");
        }

        let result = self.executor.git(&args, &dir).await;
        if !result.success {
            return format!("Error: {}", result.error_text());
        }

        if result.stdout.trim().is_empty() {
            "No changes".to_string()
        } else {
            result.stdout
        }
    }

    pub async fn log(
        &self,
        repo_path: Option<&str>,
        expected_repo: Option<&str>,
        count: usize,
    ) -> String {
        let dir = match self.target_dir(repo_path, expected_repo).await {
            Ok(dir) => dir,
            Err(e) => return e,
        };

        let count = count.max(1).to_string();
        let result = self
            .executor
            .git(&["log", "--oneline", "-n", count.as_str()], &dir)
            .await;

        if result.success {
            result.stdout.trim().to_string()
        } else {
            format!("Error: {}", result.error_text())
        }
    }

    /// Run an arbitrary command through `sh -c` after the dangerous-pattern scan
    pub async fn run_shell(&self, command: &str, repo_path: Option<&str>) -> String {
        let dir = self.resolver.resolve(repo_path);

        if let Err(violation) = self.policy.check_shell_command(command) {
            return self.reject(command, violation, &dir);
        }

        if !dir.is_dir() {
            return format!("Error: Working directory not found: {}", dir.display());
        }

        let result = self.executor.shell(command, &dir).await;
        format_command_output(&result)
    }

    /// Run the given test command, or the one inferred from marker files
    pub async fn run_tests(&self, command: Option<&str>, repo_path: Option<&str>) -> String {
        let dir = self.resolver.resolve(repo_path);
        if !dir.is_dir() {
            return format!("Error: Working directory not found: {}", dir.display());
        }

        let command = match command.map(str::trim).filter(|c| !c.is_empty()) {
            Some(explicit) => {
                if let Err(violation) = self.policy.check_shell_command(explicit) {
                    return self.reject(explicit, violation, &dir);
                }
                explicit.to_string()
            }
            None => match detect_test_command(&dir) {
                Some(detected) => detected.to_string(),
                None => {
                    return format!(
                        "No test command could be determined for {}. Provide the command explicitly.",
                        dir.display()
                    );
                }
            },
        };

        info!(command = %command, dir = %dir.display(), "running tests");
        let result = self.executor.shell(&command, &dir).await;
        format!("Test command: {}\n{}", command, format_command_output(&result))
    }
}
