use clap::{Parser, Subcommand};
use issuesmith::audit::AuditLogger;
use issuesmith::tools::stdio;
use issuesmith::{AppResult, Config, GitHubClient, GitOperations, ToolRegistry};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{self, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Git and GitHub tools for an issue-to-pull-request agent
#[derive(Debug, Parser)]
#[command(name = "issuesmith", version, about)]
struct Cli {
    /// Config file (defaults to ~/.config/issuesmith/config.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base directory holding the workspace (defaults to the current directory)
    #[arg(long, global = true)]
    workspace: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve JSON-lines tool calls on stdin/stdout
    Serve,
    /// Print tool definitions as JSON
    Tools,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // stdout carries tool replies; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(workspace) = cli.workspace {
        config.workspace.base_dir = Some(workspace);
    }

    // Missing credentials stop the process here, not on the first tool call
    let credentials = config.credentials()?;

    let cwd = std::env::current_dir()?;
    let resolver = config.resolver(&cwd);
    info!(
        workspace = %resolver.workspace_root().display(),
        llm_provider = %config.llm.provider,
        llm_model = %config.llm.model,
        "starting issuesmith"
    );

    let audit = if config.audit.enabled {
        let logger = match &config.audit.log_path {
            Some(path) => AuditLogger::with_path(path)?,
            None => AuditLogger::new()?,
        };
        Some(Arc::new(logger))
    } else {
        None
    };

    let mut ops = GitOperations::new(resolver, config.safety_policy());
    if let Some(audit) = &audit {
        ops = ops.with_audit(Arc::clone(audit));
    }

    let github = GitHubClient::new(credentials.github_token)?
        .with_api_base(config.github.api_base.trim())
        .with_user_agent(config.github.user_agent.clone());

    let mut registry = ToolRegistry::with_defaults(Arc::new(ops), Arc::new(github));
    if let Some(audit) = audit {
        registry = registry.with_audit(audit);
    }

    match cli.command {
        Command::Tools => {
            println!("{}", serde_json::to_string_pretty(&registry.definitions())?);
        }
        Command::Serve => {
            info!(tools = registry.len(), "serving tool calls on stdin");
            stdio::serve(&registry, BufReader::new(io::stdin()), io::stdout()).await?;
        }
    }

    Ok(())
}
