use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

const ISSUE_FORMATS: &str = "https://github.com/owner/repo/issues/123 or owner/repo#123";
const PR_FORMATS: &str = "https://github.com/owner/repo/pull/123";

static ISSUE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/\s]+)/([^/\s]+)/issues/(\d+)").expect("valid issue URL pattern")
});

static ISSUE_SHORTHAND: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^/\s#]+)/([^/\s#]+)#(\d+)$").expect("valid issue shorthand pattern")
});

static PR_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"github\.com/([^/\s]+)/([^/\s]+)/pull/(\d+)").expect("valid PR URL pattern")
});

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReferenceError {
    #[error("Invalid {kind} reference '{input}'. Accepted formats: {accepted}")]
    InvalidReferenceFormat {
        kind: &'static str,
        input: String,
        accepted: &'static str,
    },
}

/// `owner/repo#number` pointing at an issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssueReference {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

/// `owner/repo` plus pull request number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrReference {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

impl fmt::Display for IssueReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

impl fmt::Display for PrReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.owner, self.repo, self.number)
    }
}

fn captures(pattern: &Regex, text: &str) -> Option<(String, String, u64)> {
    let caps = pattern.captures(text)?;
    let number = caps[3].parse::<u64>().ok()?;
    Some((caps[1].to_string(), caps[2].to_string(), number))
}

/// Parse a full issue URL or `owner/repo#number`
///
/// Only the shape is checked; whether the issue exists is left to the API.
pub fn parse_issue_reference(text: &str) -> Result<IssueReference, ReferenceError> {
    let text = text.trim();
    captures(&ISSUE_URL, text)
        .or_else(|| captures(&ISSUE_SHORTHAND, text))
        .map(|(owner, repo, number)| IssueReference { owner, repo, number })
        .ok_or_else(|| ReferenceError::InvalidReferenceFormat {
            kind: "issue",
            input: text.to_string(),
            accepted: ISSUE_FORMATS,
        })
}

/// Parse a full pull request URL
pub fn parse_pr_reference(text: &str) -> Result<PrReference, ReferenceError> {
    let text = text.trim();
    captures(&PR_URL, text)
        .map(|(owner, repo, number)| PrReference { owner, repo, number })
        .ok_or_else(|| ReferenceError::InvalidReferenceFormat {
            kind: "pull request",
            input: text.to_string(),
            accepted: PR_FORMATS,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widgets_42() -> IssueReference {
        IssueReference {
            owner: "acme".to_string(),
            repo: "widgets".to_string(),
            number: 42,
        }
    }

    #[test]
    fn test_issue_url() {
        let parsed = parse_issue_reference("https://github.com/acme/widgets/issues/42").unwrap();
        assert_eq!(parsed, widgets_42());
    }

    #[test]
    fn test_issue_shorthand() {
        let parsed = parse_issue_reference("acme/widgets#42").unwrap();
        assert_eq!(parsed, widgets_42());
    }

    #[test]
    fn test_issue_url_with_fragment() {
        let parsed =
            parse_issue_reference("https://github.com/acme/widgets/issues/42#issuecomment-1").unwrap();
        assert_eq!(parsed, widgets_42());
    }

    #[test]
    fn test_issue_whitespace_trimmed() {
        assert_eq!(parse_issue_reference("  acme/widgets#42\n").unwrap(), widgets_42());
    }

    #[test]
    fn test_invalid_issue_lists_formats() {
        let err = parse_issue_reference("widgets 42").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("widgets 42"));
        assert!(message.contains("owner/repo#123"));
        assert!(message.contains("/issues/123"));
    }

    #[test]
    fn test_pr_url_is_not_an_issue() {
        assert!(parse_issue_reference("https://github.com/acme/widgets/pull/42").is_err());
    }

    #[test]
    fn test_pr_url() {
        let parsed = parse_pr_reference("https://github.com/acme/widgets/pull/7").unwrap();
        assert_eq!(parsed.owner, "acme");
        assert_eq!(parsed.repo, "widgets");
        assert_eq!(parsed.number, 7);
    }

    #[test]
    fn test_pr_url_with_subpage() {
        let parsed = parse_pr_reference("https://github.com/acme/widgets/pull/7/files").unwrap();
        assert_eq!(parsed.number, 7);
    }

    #[test]
    fn test_pr_shorthand_rejected() {
        let err = parse_pr_reference("acme/widgets#7").unwrap_err();
        assert!(matches!(err, ReferenceError::InvalidReferenceFormat { kind: "pull request", .. }));
    }

    #[test]
    fn test_number_overflow_rejected() {
        assert!(parse_issue_reference("acme/widgets#99999999999999999999999").is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(widgets_42().to_string(), "acme/widgets#42");
    }
}
