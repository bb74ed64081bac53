use serde::Serialize;

/// Parse `git status --porcelain -z` output
///
/// Records are NUL-terminated `XY <path>` entries with paths left verbatim:
/// no quoting, no trimming. A rename or copy is followed by an extra record
/// holding the original path.
pub fn parse_status_porcelain(output: &str) -> Vec<StatusEntry> {
    let mut entries = Vec::new();
    let mut records = output.split('\0');

    while let Some(record) = records.next() {
        if record.len() < 4 || !record.is_char_boundary(2) || !record.is_char_boundary(3) {
            continue;
        }

        let code = &record[..2];
        let file = &record[3..];
        let orig_file = if code.contains('R') || code.contains('C') {
            records.next().filter(|p| !p.is_empty()).map(str::to_string)
        } else {
            None
        };

        entries.push(StatusEntry {
            status: code.trim().to_string(),
            file: file.to_string(),
            orig_file,
        });
    }

    entries
}

/// Parse `git branch --show-current` output; empty means detached HEAD
pub fn parse_current_branch(output: &str) -> Option<String> {
    let branch = output.trim();
    if branch.is_empty() {
        None
    } else {
        Some(branch.to_string())
    }
}

/// A changed path reported by `git status --porcelain`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    pub status: String,
    pub file: String,
    /// Source path of a rename or copy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orig_file: Option<String>,
}

/// Working tree summary returned by the status operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GitStatus {
    pub branch: Option<String>,
    pub clean: bool,
    pub changes: Vec<StatusEntry>,
}

impl GitStatus {
    pub fn new(branch: Option<String>, changes: Vec<StatusEntry>) -> Self {
        Self {
            branch,
            clean: changes.is_empty(),
            changes,
        }
    }
}
