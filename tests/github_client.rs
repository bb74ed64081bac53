//! GitHub client against a local HTTP/1.1 stand-in for the REST API

use issuesmith::github::{GitHubClient, GitHubError, NewPullRequest};
use issuesmith::github::{parse_issue_reference, parse_pr_reference};
use issuesmith::tools::ToolRegistry;
use issuesmith::{GitOperations, SafetyPolicy, WorkspaceResolver};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

#[derive(Debug, Clone)]
struct RecordedRequest {
    method: String,
    path: String,
    headers: HashMap<String, String>,
    body: String,
}

struct Route {
    method: &'static str,
    path: &'static str,
    status: u16,
    body: String,
}

fn route(method: &'static str, path: &'static str, status: u16, body: Value) -> Route {
    Route {
        method,
        path,
        status,
        body: body.to_string(),
    }
}

/// Answers canned responses and records every request it sees
struct FakeGitHub {
    base: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl FakeGitHub {
    async fn start(routes: Vec<Route>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let routes = Arc::new(routes);

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let routes = Arc::clone(&routes);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    handle_connection(stream, &routes, &recorded).await;
                });
            }
        });

        Self { base, requests }
    }

    fn client(&self) -> GitHubClient {
        GitHubClient::new("test-token")
            .unwrap()
            .with_api_base(&self.base)
    }

    fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

fn find_header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n").map(|p| p + 4)
}

async fn handle_connection(
    mut stream: TcpStream,
    routes: &[Route],
    recorded: &Mutex<Vec<RecordedRequest>>,
) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(end) = find_header_end(&buf) {
            break end;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split_whitespace();
    let method = request_line.next().unwrap_or_default().to_string();
    let path = request_line.next().unwrap_or_default().to_string();
    let headers: HashMap<String, String> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .get("content-length")
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(0);
    while buf.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    let (status, payload) = routes
        .iter()
        .find(|r| r.method == method && r.path == path)
        .map(|r| (r.status, r.body.clone()))
        .unwrap_or((404, json!({"message": "Not Found"}).to_string()));

    recorded.lock().unwrap().push(RecordedRequest {
        method,
        path,
        headers,
        body,
    });

    let reason = match status {
        200 => "OK",
        201 => "Created",
        404 => "Not Found",
        422 => "Unprocessable Entity",
        _ => "Error",
    };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        payload.len(),
        payload
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn issue_json() -> Value {
    json!({
        "number": 42,
        "title": "Crash when widget list is empty",
        "body": "Steps to reproduce...",
        "state": "open",
        "user": {"login": "reporter"},
        "labels": [{"name": "bug"}, {"name": "good first issue"}],
        "html_url": "https://github.com/acme/widgets/issues/42",
        "created_at": "2026-01-02T03:04:05Z",
        "updated_at": "2026-01-03T03:04:05Z"
    })
}

#[tokio::test]
async fn test_fetch_issue_with_comments() {
    let server = FakeGitHub::start(vec![
        route("GET", "/repos/acme/widgets/issues/42", 200, issue_json()),
        route(
            "GET",
            "/repos/acme/widgets/issues/42/comments",
            200,
            json!([
                {"user": {"login": "maintainer"}, "body": "Confirmed", "created_at": "2026-01-02T05:00:00Z"},
                {"user": null, "body": "+1"}
            ]),
        ),
    ])
    .await;

    let reference = parse_issue_reference("acme/widgets#42").unwrap();
    let issue = server.client().fetch_issue(&reference).await.unwrap();

    assert_eq!(issue.number, 42);
    assert_eq!(issue.title, "Crash when widget list is empty");
    assert_eq!(issue.author, "reporter");
    assert_eq!(issue.labels, vec!["bug", "good first issue"]);
    assert_eq!(issue.comments.len(), 2);
    assert_eq!(issue.comments[0].author, "maintainer");
    assert_eq!(issue.comments[1].author, "ghost");
}

#[tokio::test]
async fn test_requests_carry_auth_and_api_headers() {
    let server = FakeGitHub::start(vec![
        route("GET", "/repos/acme/widgets/issues/42", 200, issue_json()),
        route("GET", "/repos/acme/widgets/issues/42/comments", 200, json!([])),
    ])
    .await;

    let reference = parse_issue_reference("https://github.com/acme/widgets/issues/42").unwrap();
    server.client().fetch_issue(&reference).await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    for request in &requests {
        assert_eq!(request.method, "GET");
        assert_eq!(request.headers["authorization"], "Bearer test-token");
        assert_eq!(request.headers["accept"], "application/vnd.github.v3+json");
        assert_eq!(request.headers["user-agent"], "issuesmith");
    }
}

#[tokio::test]
async fn test_failed_comment_fetch_degrades_to_empty() {
    let server = FakeGitHub::start(vec![
        route("GET", "/repos/acme/widgets/issues/42", 200, issue_json()),
        route(
            "GET",
            "/repos/acme/widgets/issues/42/comments",
            500,
            json!({"message": "Server Error"}),
        ),
    ])
    .await;

    let reference = parse_issue_reference("acme/widgets#42").unwrap();
    let issue = server.client().fetch_issue(&reference).await.unwrap();

    assert_eq!(issue.title, "Crash when widget list is empty");
    assert!(issue.comments.is_empty());
}

#[tokio::test]
async fn test_missing_issue_is_an_api_error() {
    let server = FakeGitHub::start(vec![]).await;

    let reference = parse_issue_reference("acme/widgets#404").unwrap();
    let err = server.client().fetch_issue(&reference).await.unwrap_err();

    match err {
        GitHubError::Api { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("Not Found"));
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_pull_request_queries() {
    let server = FakeGitHub::start(vec![
        route(
            "GET",
            "/repos/acme/widgets/pulls/7",
            200,
            json!({
                "number": 7,
                "title": "Fix empty widget list",
                "body": null,
                "state": "open",
                "user": {"login": "contributor"},
                "html_url": "https://github.com/acme/widgets/pull/7",
                "head": {"ref": "fix/issue-42", "sha": "abc123"},
                "base": {"ref": "main", "sha": "def456"},
                "draft": false,
                "merged": false,
                "mergeable": true,
                "additions": 10,
                "deletions": 2,
                "changed_files": 1
            }),
        ),
        route(
            "GET",
            "/repos/acme/widgets/pulls/7/reviews",
            200,
            json!([{"user": {"login": "maintainer"}, "body": "Needs a test", "state": "CHANGES_REQUESTED"}]),
        ),
        route(
            "GET",
            "/repos/acme/widgets/pulls/7/comments",
            200,
            json!([{
                "id": 99,
                "user": {"login": "maintainer"},
                "body": "Handle None here",
                "path": "src/list.rs",
                "line": null,
                "original_line": 12,
                "diff_hunk": "@@ -10,3 +10,4 @@"
            }]),
        ),
        route(
            "GET",
            "/repos/acme/widgets/issues/7/comments",
            200,
            json!([{"user": {"login": "bot"}, "body": "CI passed"}]),
        ),
    ])
    .await;

    let client = server.client();
    let reference = parse_pr_reference("https://github.com/acme/widgets/pull/7").unwrap();

    let details = client.fetch_pr_details(&reference).await.unwrap();
    assert_eq!(details.head_branch, "fix/issue-42");
    assert_eq!(details.base_branch, "main");
    assert_eq!(details.body, "");
    assert_eq!(details.mergeable, Some(true));

    let reviews = client.fetch_pr_reviews(&reference).await.unwrap();
    assert_eq!(reviews.len(), 1);
    assert_eq!(reviews[0].state, "CHANGES_REQUESTED");

    let inline = client.fetch_pr_review_comments(&reference).await.unwrap();
    assert_eq!(inline[0].path, "src/list.rs");
    assert_eq!(inline[0].line, Some(12));

    let conversation = client.fetch_pr_conversation(&reference).await.unwrap();
    assert_eq!(conversation[0].author, "bot");
    assert_eq!(conversation[0].body, "CI passed");
}

#[tokio::test]
async fn test_get_repo_info() {
    let server = FakeGitHub::start(vec![route(
        "GET",
        "/repos/acme/widgets",
        200,
        json!({
            "full_name": "acme/widgets",
            "description": "Widgets for everyone",
            "default_branch": "trunk",
            "html_url": "https://github.com/acme/widgets",
            "clone_url": "https://github.com/acme/widgets.git",
            "private": false,
            "fork": false,
            "language": "Rust",
            "open_issues_count": 3
        }),
    )])
    .await;

    let info = server.client().get_repo_info("acme", "widgets").await.unwrap();
    assert_eq!(info.full_name, "acme/widgets");
    assert_eq!(info.default_branch, "trunk");
    assert_eq!(info.clone_url, "https://github.com/acme/widgets.git");
}

#[tokio::test]
async fn test_create_pull_request_posts_body() {
    let server = FakeGitHub::start(vec![route(
        "POST",
        "/repos/acme/widgets/pulls",
        201,
        json!({
            "number": 8,
            "html_url": "https://github.com/acme/widgets/pull/8",
            "title": "Fix empty widget list",
            "state": "open"
        }),
    )])
    .await;

    let new_pr = NewPullRequest {
        title: "Fix empty widget list".to_string(),
        body: "Closes #42".to_string(),
        head: "fix/issue-42".to_string(),
        base: "main".to_string(),
    };
    let created = server
        .client()
        .create_pull_request("acme", "widgets", &new_pr)
        .await
        .unwrap();

    assert_eq!(created.number, 8);
    assert_eq!(created.url, "https://github.com/acme/widgets/pull/8");

    let requests = server.requests();
    assert_eq!(requests[0].method, "POST");
    let sent: NewPullRequest = serde_json::from_str(&requests[0].body).unwrap();
    assert_eq!(sent, new_pr);
}

#[tokio::test]
async fn test_create_pull_request_failure_passes_body_through() {
    let rejection = json!({
        "message": "Validation Failed",
        "errors": [{"resource": "PullRequest", "code": "custom", "message": "No commits between main and fix/issue-42"}]
    });
    let server = FakeGitHub::start(vec![route(
        "POST",
        "/repos/acme/widgets/pulls",
        422,
        rejection.clone(),
    )])
    .await;

    let workspace = TempDir::new().unwrap();
    let ops = Arc::new(GitOperations::new(
        WorkspaceResolver::new(workspace.path()),
        SafetyPolicy::default(),
    ));
    let registry = ToolRegistry::with_defaults(ops, Arc::new(server.client()));

    let output = registry
        .dispatch(
            "create_pull_request",
            json!({
                "owner": "acme",
                "repo": "widgets",
                "title": "Fix empty widget list",
                "body": "Closes #42",
                "head": "fix/issue-42",
                "base": "main"
            }),
        )
        .await
        .unwrap();

    assert_eq!(
        output,
        format!("Error creating pull request: {}", rejection)
    );
}

#[tokio::test]
async fn test_fetch_issue_tool_renders_json() {
    let server = FakeGitHub::start(vec![
        route("GET", "/repos/acme/widgets/issues/42", 200, issue_json()),
        route("GET", "/repos/acme/widgets/issues/42/comments", 200, json!([])),
    ])
    .await;

    let workspace = TempDir::new().unwrap();
    let ops = Arc::new(GitOperations::new(
        WorkspaceResolver::new(workspace.path()),
        SafetyPolicy::default(),
    ));
    let registry = ToolRegistry::with_defaults(ops, Arc::new(server.client()));

    let output = registry
        .dispatch("fetch_issue", json!({"issue": "acme/widgets#42"}))
        .await
        .unwrap();
    let rendered: Value = serde_json::from_str(&output).unwrap();
    assert_eq!(rendered["number"], 42);
    assert_eq!(rendered["labels"][0], "bug");
}
