use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::{GitHubTool, GitTool, Tool, ToolDefinition, ToolError};
use crate::audit::AuditLogger;
use crate::git::GitOperations;
use crate::github::GitHubClient;

/// Name-indexed set of tools with a single dispatch entry point
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
    audit: Option<Arc<AuditLogger>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every git, shell and GitHub tool
    pub fn with_defaults(ops: Arc<GitOperations>, github: Arc<GitHubClient>) -> Self {
        let mut registry = Self::new();
        for tool in GitTool::all(ops) {
            registry.register(tool);
        }
        for tool in GitHubTool::all(github) {
            registry.register(tool);
        }
        registry
    }

    pub fn with_audit(mut self, audit: Arc<AuditLogger>) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Add a tool, replacing any tool already registered under its name
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Run the named tool to completion
    pub async fn dispatch(&self, name: &str, args: Value) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;

        info!(tool = name, "tool call");
        let args_text = args.to_string();
        let result = tool.execute(args).await;

        if let Err(e) = &result {
            warn!(tool = name, error = %e, "tool call rejected");
        }

        if let Some(audit) = &self.audit {
            if let Err(e) = audit.log_tool_call(name, &args_text, result.is_ok()) {
                warn!(error = %e, "failed to write audit log");
            }
        }

        result
    }
}
