//! GitHub API test utilities

use mockito::{Mock, Server, ServerGuard};

/// JSON body of a "latest release" response
pub fn release_body(owner: &str, repo: &str, tag: &str) -> String {
    serde_json::json!({
        "tag_name": tag,
        "html_url": format!("https://github.com/{owner}/{repo}/releases/tag/{tag}"),
        "body": format!("Release {tag}"),
        "published_at": "2024-01-15T00:00:00Z",
        "draft": false,
        "prerelease": false
    })
    .to_string()
}

/// Start a mock GitHub API serving one "latest release" response
pub fn start_github_server(
    owner: &str,
    repo: &str,
    status: usize,
    body: &str,
) -> (ServerGuard, Mock) {
    let mut server = Server::new();
    let mock = server
        .mock("GET", format!("/repos/{owner}/{repo}/releases/latest").as_str())
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(1)
        .create();

    (server, mock)
}
