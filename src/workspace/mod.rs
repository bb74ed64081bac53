pub mod resolver;
pub mod test_command;

pub use resolver::{repo_name_from_url, WorkspaceResolver, DEFAULT_WORKSPACE_DIR};
pub use test_command::{detect_test_command, TEST_COMMAND_MARKERS};
