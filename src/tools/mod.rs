//! Named, schema-described tools the host agent framework calls.
//!
//! Each tool takes a JSON object of arguments and returns text for the model.
//! Operational failures (a failed command, a blocked push, an HTTP error) are
//! part of that text. A [`ToolError`] means the call itself was malformed.

pub mod git_tools;
pub mod github_tools;
pub mod registry;
pub mod stdio;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::github::reference::ReferenceError;

pub use git_tools::{GitTool, GitToolKind};
pub use github_tools::{GitHubTool, GitHubToolKind};
pub use registry::ToolRegistry;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error(transparent)]
    InvalidReference(#[from] ReferenceError),
}

/// What the agent framework sees when listing tools
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// JSON schema for the arguments object
    fn parameters(&self) -> Value;

    async fn execute(&self, args: Value) -> Result<String, ToolError>;

    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Deserialize a tool's arguments, treating `null` as an empty object
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };

    serde_json::from_value(args).map_err(|e| ToolError::InvalidArguments {
        tool: tool.to_string(),
        message: e.to_string(),
    })
}
