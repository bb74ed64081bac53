#![allow(dead_code)]

use issuesmith::{GitOperations, SafetyPolicy, WorkspaceResolver};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tempfile::TempDir;

/// Run git in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("Failed to run git");
    assert!(
        output.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(dir: &Path) {
    git(dir, &["config", "user.name", "Test User"]);
    git(dir, &["config", "user.email", "test@example.com"]);
    git(dir, &["config", "commit.gpgsign", "false"]);
}

/// Helper to create a test git repository on branch `main`
pub fn create_test_repo() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let repo_path = temp_dir.path().to_path_buf();

    git(&repo_path, &["init"]);
    git(&repo_path, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    configure_identity(&repo_path);

    (temp_dir, repo_path)
}

/// Helper to create a commit
pub fn create_commit(repo_path: &Path, file: &str, content: &str, message: &str) {
    fs::write(repo_path.join(file), content).expect("Failed to write file");
    git(repo_path, &["add", file]);
    git(repo_path, &["commit", "-m", message]);
}

/// A bare "remote" with one commit on `main` plus the given extra branches
///
/// Returns the temp dir holding everything and the bare repository path.
pub fn create_remote(branches: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let bare = temp_dir.path().join("widgets.git");
    let seed = temp_dir.path().join("seed");
    fs::create_dir_all(&seed).unwrap();

    git(temp_dir.path(), &["init", "--bare", bare.to_str().unwrap()]);
    git(&bare, &["symbolic-ref", "HEAD", "refs/heads/main"]);

    git(&seed, &["init"]);
    git(&seed, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    configure_identity(&seed);
    create_commit(&seed, "README.md", "widgets\n", "Initial commit");
    git(&seed, &["remote", "add", "origin", bare.to_str().unwrap()]);
    git(&seed, &["push", "origin", "main"]);

    for branch in branches {
        git(&seed, &["checkout", "-b", branch]);
        create_commit(&seed, "README.md", &format!("widgets on {}\n", branch), "Branch work");
        git(&seed, &["push", "origin", branch]);
        git(&seed, &["checkout", "main"]);
    }

    (temp_dir, bare)
}

/// Operations rooted at `base` with the default safety policy
pub fn ops_for(base: &Path) -> Arc<GitOperations> {
    Arc::new(GitOperations::new(
        WorkspaceResolver::new(base),
        SafetyPolicy::default(),
    ))
}

/// Clone `remote` into `<base>/issues_workspace/widgets` and set an identity
pub fn clone_into_workspace(base: &Path, remote: &Path) -> PathBuf {
    let workspace = base.join("issues_workspace");
    fs::create_dir_all(&workspace).unwrap();
    let target = workspace.join("widgets");
    git(base, &["clone", remote.to_str().unwrap(), target.to_str().unwrap()]);
    configure_identity(&target);
    target
}
