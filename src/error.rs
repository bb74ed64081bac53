use std::io;
use thiserror::Error;

// Import module-level errors for AppError
use crate::config::settings::ConfigError;
use crate::github::client::GitHubError;
use crate::github::reference::ReferenceError;
use crate::tools::ToolError;

/// Top-level application error that wraps all module-specific errors
///
/// Leaf components (command execution, verification, policy checks) report
/// failures as values rather than errors. What remains here are the hard
/// failures: bad configuration at startup, malformed references, upstream
/// HTTP failures and tool argument errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("GitHub error: {0}")]
    GitHub(#[from] GitHubError),

    #[error("Reference error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
