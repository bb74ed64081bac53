use serde::Serialize;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

/// Result of running an external command
///
/// Spawn failures and non-zero exits are both reported through `success`;
/// callers never receive an error for an ordinary command failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandResult {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    /// A failed result that never reached the process (spawn error, empty argv)
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            stderr: message.into(),
            exit_code: -1,
        }
    }

    /// Trimmed stdout and stderr joined, skipping whichever is empty
    pub fn combined_output(&self) -> String {
        let stdout = self.stdout.trim();
        let stderr = self.stderr.trim();
        match (stdout.is_empty(), stderr.is_empty()) {
            (true, true) => String::new(),
            (false, true) => stdout.to_string(),
            (true, false) => stderr.to_string(),
            (false, false) => format!("{}\n{}", stdout, stderr),
        }
    }

    /// The most useful error text: stderr if present, otherwise stdout
    pub fn error_text(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }

    fn from_output(output: Output) -> Self {
        Self {
            success: output.status.success(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        }
    }
}

/// Runs external processes with captured output
///
/// Stateless: concurrent calls against independent working directories are safe.
#[derive(Debug, Clone, Default)]
pub struct CommandExecutor;

impl CommandExecutor {
    pub fn new() -> Self {
        Self
    }

    /// Spawn `argv[0]` with the remaining elements as arguments
    pub async fn run<S: AsRef<str>>(&self, argv: &[S], working_dir: Option<&Path>) -> CommandResult {
        let Some((program, args)) = argv.split_first() else {
            return CommandResult::failure("Empty command");
        };

        let mut command = Command::new(program.as_ref());
        command
            .args(args.iter().map(|a| a.as_ref()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Never block on a credential prompt
            .env("GIT_TERMINAL_PROMPT", "0");

        if let Some(dir) = working_dir {
            command.current_dir(dir);
        }

        let rendered = argv.iter().map(|a| a.as_ref()).collect::<Vec<_>>().join(" ");
        debug!(command = %rendered, cwd = ?working_dir, "running command");

        match command.output().await {
            Ok(output) => {
                let result = CommandResult::from_output(output);
                debug!(command = %rendered, exit_code = result.exit_code, "command finished");
                result
            }
            Err(e) => {
                debug!(command = %rendered, error = %e, "command failed to start");
                CommandResult::failure(format!("Failed to execute {}: {}", program.as_ref(), e))
            }
        }
    }

    /// Run `git` with the given arguments inside `working_dir`
    pub async fn git<S: AsRef<str>>(&self, args: &[S], working_dir: &Path) -> CommandResult {
        let mut argv = Vec::with_capacity(args.len() + 1);
        argv.push("git");
        argv.extend(args.iter().map(|a| a.as_ref()));
        self.run(&argv, Some(working_dir)).await
    }

    /// Run a command string through `sh -c`
    pub async fn shell(&self, command: &str, working_dir: &Path) -> CommandResult {
        self.run(&["sh", "-c", command], Some(working_dir)).await
    }
}
