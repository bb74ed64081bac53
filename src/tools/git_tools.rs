use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use super::{parse_args, Tool, ToolError};
use crate::git::GitOperations;

const DEFAULT_LOG_COUNT: usize = 10;

/// Every git and shell tool exposed to the agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitToolKind {
    Clone,
    Status,
    Checkout,
    CreateBranch,
    Add,
    Commit,
    Push,
    Diff,
    Log,
    RunShell,
    RunTests,
}

impl GitToolKind {
    pub const ALL: [GitToolKind; 11] = [
        GitToolKind::Clone,
        GitToolKind::Status,
        GitToolKind::Checkout,
        GitToolKind::CreateBranch,
        GitToolKind::Add,
        GitToolKind::Commit,
        GitToolKind::Push,
        GitToolKind::Diff,
        GitToolKind::Log,
        GitToolKind::RunShell,
        GitToolKind::RunTests,
    ];

    pub fn name(self) -> &'static str {
        match self {
            GitToolKind::Clone => "git_clone",
            GitToolKind::Status => "git_status",
            GitToolKind::Checkout => "git_checkout",
            GitToolKind::CreateBranch => "git_create_branch",
            GitToolKind::Add => "git_add",
            GitToolKind::Commit => "git_commit",
            GitToolKind::Push => "git_push",
            GitToolKind::Diff => "git_diff",
            GitToolKind::Log => "git_log",
            GitToolKind::RunShell => "run_shell",
            GitToolKind::RunTests => "run_tests",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            GitToolKind::Clone => {
                "Clone a repository into the workspace. Returns JSON with the repo_path to use for later calls. Cloning an existing target is a no-op."
            }
            GitToolKind::Status => {
                "Show the current branch and changed files as JSON ({branch, clean, changes})."
            }
            GitToolKind::Checkout => {
                "Fetch from origin and check out a branch, creating a local tracking branch if it only exists on origin."
            }
            GitToolKind::CreateBranch => "Create a new branch from HEAD and switch to it.",
            GitToolKind::Add => "Stage files for commit. Stages everything when no files are given.",
            GitToolKind::Commit => "Commit staged changes with a message.",
            GitToolKind::Push => {
                "Push the current branch to origin. Pushing to main, master, develop or production is refused."
            }
            GitToolKind::Diff => "Show unstaged changes, or staged changes with staged=true.",
            GitToolKind::Log => "Show recent commits, one line each.",
            GitToolKind::RunShell => {
                "Run a shell command in a repository. Destructive or privileged commands are refused."
            }
            GitToolKind::RunTests => {
                "Run the project's tests. Uses the given command, or infers one from files such as package.json or Cargo.toml."
            }
        }
    }

    pub fn schema(self) -> Value {
        match self {
            GitToolKind::Clone => object_schema(
                json!({
                    "url": {"type": "string", "description": "Repository URL to clone"},
                    "target_dir": {"type": "string", "description": "Directory name inside the workspace (defaults to the repository name)"},
                    "branch": {"type": "string", "description": "Branch to check out after cloning"}
                }),
                &["url"],
                false,
            ),
            GitToolKind::Status => object_schema(json!({}), &[], true),
            GitToolKind::Checkout => object_schema(
                json!({"branch": {"type": "string", "description": "Branch to check out"}}),
                &["branch"],
                true,
            ),
            GitToolKind::CreateBranch => object_schema(
                json!({"branch_name": {"type": "string", "description": "Name of the new branch"}}),
                &["branch_name"],
                true,
            ),
            GitToolKind::Add => object_schema(
                json!({"files": {"type": "array", "items": {"type": "string"}, "description": "Paths to stage"}}),
                &[],
                true,
            ),
            GitToolKind::Commit => object_schema(
                json!({"message": {"type": "string", "description": "Commit message"}}),
                &["message"],
                true,
            ),
            GitToolKind::Push => object_schema(
                json!({"set_upstream": {"type": "boolean", "description": "Set upstream tracking (default true)"}}),
                &[],
                true,
            ),
            GitToolKind::Diff => object_schema(
                json!({"staged": {"type": "boolean", "description": "Show staged changes instead of unstaged"}}),
                &[],
                true,
            ),
            GitToolKind::Log => object_schema(
                json!({"count": {"type": "integer", "minimum": 1, "description": "Number of commits (default 10)"}}),
                &[],
                true,
            ),
            GitToolKind::RunShell => object_schema(
                json!({
                    "command": {"type": "string", "description": "Shell command to run"},
                    "repo_path": {"type": "string", "description": "Repository name or path (defaults to the agent's working directory)"}
                }),
                &["command"],
                false,
            ),
            GitToolKind::RunTests => object_schema(
                json!({
                    "command": {"type": "string", "description": "Test command; inferred when omitted"},
                    "repo_path": {"type": "string", "description": "Repository name or path (defaults to the agent's working directory)"}
                }),
                &[],
                false,
            ),
        }
    }
}

/// Build an object schema, adding `repo_path`/`expected_repo` for repository tools
fn object_schema(properties: Value, required: &[&str], repo_scoped: bool) -> Value {
    let mut properties = match properties {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    if repo_scoped {
        properties.insert(
            "repo_path".to_string(),
            json!({"type": "string", "description": "Repository name returned by git_clone, or a path (defaults to the agent's working directory)"}),
        );
        properties.insert(
            "expected_repo".to_string(),
            json!({"type": "string", "description": "owner/repo the origin remote must match before acting"}),
        );
    }

    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

#[derive(Debug, Deserialize)]
struct CloneArgs {
    url: String,
    #[serde(default)]
    target_dir: Option<String>,
    #[serde(default)]
    branch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RepoArgs {
    #[serde(default)]
    repo_path: Option<String>,
    #[serde(default)]
    expected_repo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CheckoutArgs {
    branch: String,
    #[serde(flatten)]
    repo: RepoArgs,
}

#[derive(Debug, Deserialize)]
struct CreateBranchArgs {
    branch_name: String,
    #[serde(flatten)]
    repo: RepoArgs,
}

#[derive(Debug, Deserialize)]
struct AddArgs {
    #[serde(default)]
    files: Vec<String>,
    #[serde(flatten)]
    repo: RepoArgs,
}

#[derive(Debug, Deserialize)]
struct CommitArgs {
    message: String,
    #[serde(flatten)]
    repo: RepoArgs,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct PushArgs {
    #[serde(default = "default_true")]
    set_upstream: bool,
    #[serde(flatten)]
    repo: RepoArgs,
}

#[derive(Debug, Deserialize)]
struct DiffArgs {
    #[serde(default)]
    staged: bool,
    #[serde(flatten)]
    repo: RepoArgs,
}

#[derive(Debug, Deserialize)]
struct LogArgs {
    #[serde(default)]
    count: Option<usize>,
    #[serde(flatten)]
    repo: RepoArgs,
}

#[derive(Debug, Deserialize)]
struct ShellArgs {
    command: String,
    #[serde(default)]
    repo_path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TestArgs {
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    repo_path: Option<String>,
}

/// A git or shell tool backed by shared [`GitOperations`]
pub struct GitTool {
    kind: GitToolKind,
    ops: Arc<GitOperations>,
}

impl GitTool {
    pub fn new(kind: GitToolKind, ops: Arc<GitOperations>) -> Self {
        Self { kind, ops }
    }

    /// One tool per [`GitToolKind`], all sharing `ops`
    pub fn all(ops: Arc<GitOperations>) -> Vec<GitTool> {
        GitToolKind::ALL
            .iter()
            .map(|kind| GitTool::new(*kind, Arc::clone(&ops)))
            .collect()
    }
}

#[async_trait]
impl Tool for GitTool {
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
        let ops = &self.ops;

        let output = match self.kind {
            GitToolKind::Clone => {
                let a: CloneArgs = parse_args(name, args)?;
                ops.clone_repo(&a.url, a.target_dir.as_deref(), a.branch.as_deref())
                    .await
            }
            GitToolKind::Status => {
                let a: RepoArgs = parse_args(name, args)?;
                ops.status(a.repo_path.as_deref(), a.expected_repo.as_deref())
                    .await
            }
            GitToolKind::Checkout => {
                let a: CheckoutArgs = parse_args(name, args)?;
                ops.checkout(&a.branch, a.repo.repo_path.as_deref(), a.repo.expected_repo.as_deref())
                    .await
            }
            GitToolKind::CreateBranch => {
                let a: CreateBranchArgs = parse_args(name, args)?;
                ops.create_branch(
                    &a.branch_name,
                    a.repo.repo_path.as_deref(),
                    a.repo.expected_repo.as_deref(),
                )
                .await
            }
            GitToolKind::Add => {
                let a: AddArgs = parse_args(name, args)?;
                ops.add(&a.files, a.repo.repo_path.as_deref(), a.repo.expected_repo.as_deref())
                    .await
            }
            GitToolKind::Commit => {
                let a: CommitArgs = parse_args(name, args)?;
                ops.commit(&a.message, a.repo.repo_path.as_deref(), a.repo.expected_repo.as_deref())
                    .await
            }
            GitToolKind::Push => {
                let a: PushArgs = parse_args(name, args)?;
                ops.push(
                    a.repo.repo_path.as_deref(),
                    a.repo.expected_repo.as_deref(),
                    a.set_upstream,
                )
                .await
            }
            GitToolKind::Diff => {
                let a: DiffArgs = parse_args(name, args)?;
                ops.diff(a.repo.repo_path.as_deref(), a.repo.expected_repo.as_deref(), a.staged)
                    .await
            }
            GitToolKind::Log => {
                let a: LogArgs = parse_args(name, args)?;
                ops.log(
                    a.repo.repo_path.as_deref(),
                    a.repo.expected_repo.as_deref(),
                    a.count.unwrap_or(DEFAULT_LOG_COUNT),
                )
                .await
            }
            GitToolKind::RunShell => {
                let a: ShellArgs = parse_args(name, args)?;
                ops.run_shell(&a.command, a.repo_path.as_deref()).await
            }
            GitToolKind::RunTests => {
                let a: TestArgs = parse_args(name, args)?;
                ops.run_tests(a.command.as_deref(), a.repo_path.as_deref())
                    .await
            }
        };

        Ok(output)
    }
}
