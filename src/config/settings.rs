use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::github::{GITHUB_API_BASE, USER_AGENT};
use crate::security::{SafetyPolicy, DANGEROUS_SHELL_PATTERNS, PROTECTED_BRANCHES};
use crate::workspace::{WorkspaceResolver, DEFAULT_WORKSPACE_DIR};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing credential: environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Invalid config value: {0}")]
    InvalidValue(String),
}

/// Process-wide settings, built once at startup and passed to components
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub github: GitHubConfig,
    pub llm: LLMConfig,
    pub workspace: WorkspaceConfig,
    pub safety: SafetyConfig,
    pub audit: AuditConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_base: String,
    pub user_agent: String,
    pub token_env: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LLMConfig {
    pub provider: String,
    pub model: String,
    pub api_key_env: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Ambient working directory; the process cwd when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_dir: Option<PathBuf>,
    pub dir_name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct SafetyConfig {
    pub protected_branches: Vec<String>,
    pub dangerous_patterns: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_base: GITHUB_API_BASE.to_string(),
            user_agent: USER_AGENT.to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            provider: "anthropic".to_string(),
            model: "claude-sonnet-4-5-20250929".to_string(),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
        }
    }
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            base_dir: None,
            dir_name: DEFAULT_WORKSPACE_DIR.to_string(),
        }
    }
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            protected_branches: PROTECTED_BRANCHES.iter().map(|s| s.to_string()).collect(),
            dangerous_patterns: DANGEROUS_SHELL_PATTERNS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Secrets read from the environment at startup
#[derive(Clone)]
pub struct Credentials {
    pub github_token: String,
    pub llm_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("github_token", &"<redacted>")
            .field("llm_api_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        let home = std::env::var("HOME").ok()?;
        Some(PathBuf::from(home).join(".config").join("issuesmith"))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Some(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration
    ///
    /// An explicit `path` must exist. Without one, the default config file is
    /// used when present and built-in defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::config_path().filter(|p| p.is_file()) {
                Some(default_path) => Self::from_file(&default_path)?,
                None => Config::default(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        let api_base = self.github.api_base.trim();
        if !(api_base.starts_with("https://") || api_base.starts_with("http://")) {
            return Err(ConfigError::InvalidValue(format!(
                "github.api_base must be an http(s) URL, got '{}'",
                self.github.api_base
            )));
        }

        if self.github.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "github.user_agent must not be empty".to_string(),
            ));
        }

        if self.llm.provider.trim().is_empty() || self.llm.model.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "llm.provider and llm.model must not be empty".to_string(),
            ));
        }

        if self.github.token_env.trim().is_empty() || self.llm.api_key_env.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "credential environment variable names must not be empty".to_string(),
            ));
        }

        let dir_name = self.workspace.dir_name.trim();
        if dir_name.is_empty() || dir_name.contains('/') || dir_name.contains('\\') || dir_name == ".." {
            return Err(ConfigError::InvalidValue(format!(
                "workspace.dir_name must be a single directory name, got '{}'",
                self.workspace.dir_name
            )));
        }

        Ok(())
    }

    /// Read the GitHub token and LLM key from the environment
    pub fn credentials(&self) -> Result<Credentials, ConfigError> {
        self.credentials_from(|name| std::env::var(name).ok())
    }

    /// Resolve credentials through `lookup`; empty values count as missing
    pub fn credentials_from<F>(&self, lookup: F) -> Result<Credentials, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingCredential(name.to_string()))
        };

        Ok(Credentials {
            github_token: require(&self.github.token_env)?,
            llm_api_key: require(&self.llm.api_key_env)?,
        })
    }

    /// Workspace resolver rooted at `base_dir`, or `fallback_base` when unset
    ///
    /// A relative `base_dir` is taken relative to `fallback_base`.
    pub fn resolver(&self, fallback_base: &Path) -> WorkspaceResolver {
        let base = match &self.workspace.base_dir {
            Some(base_dir) => fallback_base.join(base_dir),
            None => fallback_base.to_path_buf(),
        };
        WorkspaceResolver::with_dir_name(base, self.workspace.dir_name.trim())
    }

    pub fn safety_policy(&self) -> SafetyPolicy {
        SafetyPolicy::new(
            &self.safety.protected_branches,
            self.safety.dangerous_patterns.iter().cloned(),
        )
    }
}
