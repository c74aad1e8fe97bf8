#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Fine in tests")]
use std::sync::Arc;

use folio_commonmark::{MarkdownOptions, MarkdownProcessor, SnippetFetcher};
use folio_github::{GithubClient, GithubSettings};
use jiff::civil::date;
use serde_json::json;
use wiremock::{
  Mock,
  MockServer,
  ResponseTemplate,
  matchers::{header, method, path, query_param},
};

fn settings(server: &MockServer, token: Option<&str>) -> GithubSettings {
  GithubSettings {
    api_url: server.uri(),
    raw_url: server.uri(),
    token: token.map(str::to_string),
    ..GithubSettings::default()
  }
}

// reqwest's blocking client owns a runtime of its own, so it is built and
// dropped on a blocking thread rather than inside the test's async context.
async fn blocking<T, F>(f: F) -> T
where
  F: FnOnce() -> T + Send + 'static,
  T: Send + 'static,
{
  tokio::task::spawn_blocking(f)
    .await
    .expect("blocking task panicked")
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_raw_returns_file_contents() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/hana/spiro/main/src/lib.rs"))
    .and(header("authorization", "Bearer s3cret"))
    .respond_with(ResponseTemplate::new(200).set_body_string("pub fn spin() {}\n"))
    .expect(1)
    .mount(&server)
    .await;

  let settings = settings(&server, Some("s3cret"));
  let body = blocking(move || {
    GithubClient::new(settings)
      .unwrap()
      .fetch_raw("hana", "spiro", "main", "src/lib.rs")
  })
  .await
  .unwrap();

  assert_eq!(body, "pub fn spin() {}\n");
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_file_reports_url_and_reason() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&server)
    .await;

  let settings = settings(&server, None);
  let uri = server.uri();
  let err = blocking(move || {
    GithubClient::new(settings)
      .unwrap()
      .fetch_raw("hana", "spiro", "v1", "missing.rs")
  })
  .await
  .unwrap_err();

  assert_eq!(
    err.to_string(),
    format!("Failed to fetch {uri}/hana/spiro/v1/missing.rs: Not Found")
  );
}

#[tokio::test(flavor = "multi_thread")]
async fn search_sends_query_and_returns_items() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/search/issues"))
    .and(query_param(
      "q",
      "is:pr is:public involves:octocat updated:>2025-02-28",
    ))
    .and(query_param("per_page", "100"))
    .respond_with(ResponseTemplate::new(200).set_body_json(json!({
      "total_count": 2,
      "incomplete_results": false,
      "items": [
        {
          "id": 1,
          "number": 42,
          "title": "Add spirograph colors",
          "body": "Adds **colors**.",
          "html_url": "https://github.com/hana/spiro/pull/42",
          "repository_url": "https://api.github.com/repos/hana/spiro",
          "state": "open",
          "updated_at": "2025-03-01T10:00:00Z",
          "user": { "login": "octocat" }
        },
        {
          "id": 2,
          "number": 7,
          "title": "Fix typo",
          "body": null,
          "html_url": "https://github.com/rust-lang/book/pull/7",
          "repository_url": "https://api.github.com/repos/rust-lang/book",
          "state": "closed"
        }
      ]
    })))
    .expect(1)
    .mount(&server)
    .await;

  let settings = settings(&server, None);
  let items = blocking(move || {
    GithubClient::new(settings).unwrap().search_recent_pull_requests(
      "octocat",
      date(2025, 2, 28),
      100,
    )
  })
  .await
  .unwrap();

  assert_eq!(items.len(), 2);
  assert_eq!(items[0].number, 42);
  assert_eq!(items[0].body.as_deref(), Some("Adds **colors**."));
  assert_eq!(items[1].body, None);
  assert_eq!(
    items[0].updated_at.map(|ts| ts.to_string()).as_deref(),
    Some("2025-03-01T10:00:00Z")
  );
  assert_eq!(items[1].updated_at, None);
  assert_eq!(folio_github::project_name(&items[1].repository_url), "book");
}

#[tokio::test(flavor = "multi_thread")]
async fn search_failure_is_an_error() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/search/issues"))
    .respond_with(ResponseTemplate::new(403))
    .mount(&server)
    .await;

  let settings = settings(&server, None);
  let err = blocking(move || {
    GithubClient::new(settings).unwrap().search_recent_pull_requests(
      "octocat",
      date(2025, 1, 1),
      100,
    )
  })
  .await
  .unwrap_err();

  assert!(err.to_string().ends_with(": Forbidden"));
}

#[tokio::test(flavor = "multi_thread")]
async fn processor_resolves_github_blocks_through_client() {
  let server = MockServer::start().await;
  Mock::given(method("GET"))
    .and(path("/hana/spiro/main/src/main.rs"))
    .respond_with(ResponseTemplate::new(200).set_body_string("fn main() {}\n"))
    .mount(&server)
    .await;
  Mock::given(method("GET"))
    .and(path("/hana/spiro/main/src/gone.rs"))
    .respond_with(ResponseTemplate::new(404))
    .mount(&server)
    .await;

  let settings = settings(&server, None);
  let html = blocking(move || {
    let client: Arc<dyn SnippetFetcher> =
      Arc::new(GithubClient::new(settings).unwrap());
    let processor =
      MarkdownProcessor::new(MarkdownOptions::default()).with_fetcher(client);
    let markdown = "```github\n{\"repo\": \"hana/spiro\", \"files\": [{\"file\": \
                    \"src/main.rs\"}, {\"file\": \"src/gone.rs\"}]}\n```\n";
    processor.render(markdown).html
  })
  .await;

  assert!(html.contains("fn main() {}"));
  assert!(html.contains("// Error loading file: Failed to fetch"));
  assert!(html.contains("class=\"language-rs\""));
}
