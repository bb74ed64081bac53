pub mod executor;
pub mod operations;
pub mod parser;
pub mod verifier;

// Re-export commonly used types
pub use executor::{CommandExecutor, CommandResult};
pub use operations::{format_command_output, is_unknown_ref_error, CloneOutcome, GitOperations};
pub use parser::{parse_current_branch, parse_status_porcelain, GitStatus, StatusEntry};
pub use verifier::{remote_matches, RepoVerification, RepoVerifier};
