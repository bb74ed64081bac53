use std::path::{Path, PathBuf};

/// Directory under the base working directory that holds every clone
pub const DEFAULT_WORKSPACE_DIR: &str = "issues_workspace";

/// Maps logical repository identifiers to working directories
///
/// Every git tool accepts either the short name returned by clone or a
/// fully-qualified path; this decides which one it was given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceResolver {
    base: PathBuf,
    dir_name: String,
}

impl WorkspaceResolver {
    /// Create a resolver rooted at `base` with the default workspace directory
    pub fn new<P: AsRef<Path>>(base: P) -> Self {
        Self::with_dir_name(base, DEFAULT_WORKSPACE_DIR)
    }

    /// A relative `base` is made absolute against the process working directory
    pub fn with_dir_name<P: AsRef<Path>>(base: P, dir_name: impl Into<String>) -> Self {
        let base = base.as_ref();
        Self {
            base: std::path::absolute(base).unwrap_or_else(|_| base.to_path_buf()),
            dir_name: dir_name.into(),
        }
    }

    /// `<base>/<workspace dir>`
    pub fn workspace_root(&self) -> PathBuf {
        self.base.join(&self.dir_name)
    }

    /// Path a freshly cloned repository named `name` lives at
    pub fn clone_target(&self, name: &str) -> PathBuf {
        self.workspace_root().join(name)
    }

    /// Resolve an optional identifier to the directory an operation targets
    ///
    /// - absent or blank: the base directory itself
    /// - absolute path: returned unchanged
    /// - `<workspace dir>/...`: joined to the base directory
    /// - anything else: a bare name under the workspace root
    pub fn resolve(&self, repo_identifier: Option<&str>) -> PathBuf {
        let Some(identifier) = repo_identifier.map(str::trim).filter(|id| !id.is_empty()) else {
            return self.base.clone();
        };

        let path = Path::new(identifier);
        if path.is_absolute() {
            return path.to_path_buf();
        }

        if self.is_workspace_rooted(identifier) {
            return self.base.join(identifier);
        }

        self.clone_target(identifier)
    }

    fn is_workspace_rooted(&self, identifier: &str) -> bool {
        identifier
            .strip_prefix(self.dir_name.as_str())
            .is_some_and(|rest| rest.starts_with('/') || rest.starts_with(std::path::MAIN_SEPARATOR))
    }
}

/// Derive a clone directory name from a repository URL
///
/// Takes the final path segment, dropping trailing slashes and a `.git`
/// suffix. Works for `https://`, `ssh://` and `git@host:owner/repo` forms.
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let segment = trimmed.rsplit(['/', ':']).next()?;
    let name = segment.strip_suffix(".git").unwrap_or(segment);

    if name.is_empty() || name == "." || name == ".." {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> WorkspaceResolver {
        WorkspaceResolver::new("/srv/agent")
    }

    #[test]
    fn test_absent_identifier_returns_base() {
        assert_eq!(resolver().resolve(None), PathBuf::from("/srv/agent"));
        assert_eq!(resolver().resolve(Some("")), PathBuf::from("/srv/agent"));
        assert_eq!(resolver().resolve(Some("   ")), PathBuf::from("/srv/agent"));
    }

    #[test]
    fn test_absolute_path_unchanged() {
        assert_eq!(
            resolver().resolve(Some("/tmp/checkouts/widgets")),
            PathBuf::from("/tmp/checkouts/widgets")
        );
    }

    #[test]
    fn test_bare_name_goes_under_workspace() {
        assert_eq!(
            resolver().resolve(Some("widgets")),
            PathBuf::from("/srv/agent/issues_workspace/widgets")
        );
    }

    #[test]
    fn test_workspace_rooted_identifier_joined_to_base() {
        assert_eq!(
            resolver().resolve(Some("issues_workspace/widgets")),
            PathBuf::from("/srv/agent/issues_workspace/widgets")
        );
    }

    #[test]
    fn test_workspace_prefix_without_separator_is_a_bare_name() {
        assert_eq!(
            resolver().resolve(Some("issues_workspace_old")),
            PathBuf::from("/srv/agent/issues_workspace/issues_workspace_old")
        );
    }

    #[test]
    fn test_custom_dir_name() {
        let resolver = WorkspaceResolver::with_dir_name("/base", "clones");
        assert_eq!(resolver.workspace_root(), PathBuf::from("/base/clones"));
        assert_eq!(resolver.resolve(Some("repo")), PathBuf::from("/base/clones/repo"));
        assert_eq!(resolver.resolve(Some("clones/repo")), PathBuf::from("/base/clones/repo"));
    }

    #[test]
    fn test_relative_base_is_made_absolute() {
        let resolver = WorkspaceResolver::new("target/agent");
        let expected = std::env::current_dir().unwrap().join("target/agent");

        assert!(resolver.workspace_root().is_absolute());
        assert_eq!(resolver.workspace_root(), expected.join("issues_workspace"));
        assert_eq!(resolver.resolve(None), expected);
        assert_eq!(
            resolver.resolve(Some("widgets")),
            expected.join("issues_workspace").join("widgets")
        );
    }

    #[test]
    fn test_repo_name_from_url() {
        assert_eq!(
            repo_name_from_url("https://github.com/acme/widgets.git"),
            Some("widgets".to_string())
        );
        assert_eq!(
            repo_name_from_url("https://github.com/acme/widgets/"),
            Some("widgets".to_string())
        );
        assert_eq!(
            repo_name_from_url("git@github.com:acme/widgets.git"),
            Some("widgets".to_string())
        );
        assert_eq!(repo_name_from_url("/tmp/remotes/origin.git"), Some("origin".to_string()));
        assert_eq!(repo_name_from_url(".git"), None);
        assert_eq!(repo_name_from_url(""), None);
    }
}
