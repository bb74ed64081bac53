pub mod audit;
pub mod config;
pub mod error;
pub mod git;
pub mod github;
pub mod security;
pub mod tools;
pub mod workspace;

// Re-export commonly used types for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use git::{CommandExecutor, CommandResult, GitOperations, RepoVerification, RepoVerifier};
pub use github::{GitHubClient, IssueReference, PrReference};
pub use security::SafetyPolicy;
pub use tools::{Tool, ToolError, ToolRegistry};
pub use workspace::WorkspaceResolver;
