use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use chrono::Utc;

const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Append-only record of tool invocations and policy rejections
#[derive(Debug)]
pub struct AuditLogger {
    log_path: PathBuf,
    // Serializes rotate + append across concurrent callers
    write_lock: Mutex<()>,
}

impl AuditLogger {
    /// Create an AuditLogger with the default log path
    pub fn new() -> std::io::Result<Self> {
        Self::with_path(Self::default_log_path()?)
    }

    /// Create an AuditLogger with a custom log path
    pub fn with_path<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let log_path = path.as_ref().to_path_buf();

        // Ensure directory exists
        if let Some(parent) = log_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Ok(Self {
            log_path,
            write_lock: Mutex::new(()),
        })
    }

    /// Get the default log path: ~/.config/issuesmith/audit.log
    pub fn default_log_path() -> std::io::Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "HOME environment variable not set"
            ))?;

        Ok(PathBuf::from(home)
            .join(".config")
            .join("issuesmith")
            .join("audit.log"))
    }

    /// Log a tool invocation and whether it returned normally
    pub fn log_tool_call(&self, tool: &str, arguments: &str, ok: bool) -> std::io::Result<()> {
        let outcome = if ok { "ok" } else { "error" };
        self.append(&format!("[TOOL] [{}] [{}] {}", tool, outcome, arguments))
    }

    /// Log a command or push blocked by the safety policy
    pub fn log_policy_rejection(
        &self,
        subject: &str,
        reason: &str,
        working_dir: &Path,
    ) -> std::io::Result<()> {
        self.append(&format!(
            "[{}] [POLICY-REJECTED] subject=\"{}\" reason=\"{}\"",
            working_dir.display(),
            subject,
            reason
        ))
    }

    fn append(&self, message: &str) -> std::io::Result<()> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Check and rotate log if needed
        self.rotate_if_needed()?;

        let timestamp = Utc::now().to_rfc3339();
        let user = std::env::var("USER").unwrap_or_else(|_| "unknown".to_string());
        let log_entry = format!("[{}] [{}] {}\n", timestamp, user, message);

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)?;

        file.write_all(log_entry.as_bytes())?;
        file.flush()?;

        Ok(())
    }

    /// Rotate log file if it exceeds MAX_LOG_SIZE
    fn rotate_if_needed(&self) -> std::io::Result<()> {
        if !self.log_path.exists() {
            return Ok(());
        }

        let metadata = fs::metadata(&self.log_path)?;
        if metadata.len() > MAX_LOG_SIZE {
            // Rotate: audit.log -> audit.log.1
            let backup_path = self.log_path.with_extension("log.1");
            fs::rename(&self.log_path, backup_path)?;
        }

        Ok(())
    }

    /// Get the path to the log file
    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}
