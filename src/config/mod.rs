pub mod settings;

pub use settings::{
    AuditConfig, Config, ConfigError, Credentials, GitHubConfig, LLMConfig, SafetyConfig,
    WorkspaceConfig,
};
