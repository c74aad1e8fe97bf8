use std::time::Duration;

use folio_commonmark::codeblock::{FetchError, SnippetFetcher};
use jiff::{ToSpan, civil::Date};
use log::{debug, trace};
use reqwest::blocking::{Client, RequestBuilder, Response};

use crate::{
  error::GithubError,
  types::{PullRequest, SearchResponse},
};

/// Connection settings for [`GithubClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubSettings {
  /// Base of the REST API, without a trailing slash.
  pub api_url:    String,
  /// Base serving raw file contents, without a trailing slash.
  pub raw_url:    String,
  pub user_agent: String,
  pub token:      Option<String>,
  pub timeout:    Duration,
}

impl Default for GithubSettings {
  fn default() -> Self {
    Self {
      api_url:    "https://api.github.com".to_string(),
      raw_url:    "https://raw.githubusercontent.com".to_string(),
      user_agent: concat!("folio/", env!("CARGO_PKG_VERSION")).to_string(),
      token:      None,
      timeout:    Duration::from_secs(20),
    }
  }
}

/// Blocking GitHub client. Nothing is retried; callers decide how to show
/// a failure.
#[derive(Debug, Clone)]
pub struct GithubClient {
  http:     Client,
  settings: GithubSettings,
}

impl GithubClient {
  /// Build a client from `settings`.
  ///
  /// # Errors
  ///
  /// Returns an error if the underlying HTTP client cannot be created.
  pub fn new(settings: GithubSettings) -> Result<Self, GithubError> {
    let http = Client::builder()
      .user_agent(settings.user_agent.clone())
      .timeout(settings.timeout)
      .build()
      .map_err(GithubError::Client)?;

    Ok(Self { http, settings })
  }

  /// Fetch the contents of `path` in `owner/repo` at `commit`.
  ///
  /// # Errors
  ///
  /// Returns an error if the request fails or the server answers with a
  /// non-success status.
  pub fn fetch_raw(
    &self,
    owner: &str,
    repo: &str,
    commit: &str,
    path: &str,
  ) -> Result<String, GithubError> {
    let url = format!(
      "{}/{owner}/{repo}/{commit}/{}",
      self.settings.raw_url.trim_end_matches('/'),
      path.trim_start_matches('/')
    );
    debug!("Fetching {url}");

    let response = self.send(self.http.get(&url), &url)?;
    response
      .text()
      .map_err(|source| GithubError::Decode { url, source })
  }

  /// Public pull requests involving `username` updated after `since`.
  ///
  /// # Errors
  ///
  /// Returns an error if the search request fails or its body cannot be
  /// decoded.
  pub fn search_recent_pull_requests(
    &self,
    username: &str,
    since: Date,
    per_page: u32,
  ) -> Result<Vec<PullRequest>, GithubError> {
    let url = format!(
      "{}/search/issues",
      self.settings.api_url.trim_end_matches('/')
    );
    let query = format!("is:pr is:public involves:{username} updated:>{since}");
    let per_page = per_page.clamp(1, 100).to_string();
    debug!("Searching pull requests: {query}");

    let request = self
      .http
      .get(&url)
      .header(reqwest::header::ACCEPT, "application/vnd.github+json")
      .query(&[("q", query.as_str()), ("per_page", per_page.as_str())]);

    let response = self.send(request, &url)?;
    let search: SearchResponse = response
      .json()
      .map_err(|source| GithubError::Decode { url, source })?;

    trace!("Search returned {} pull requests", search.items.len());
    Ok(search.items)
  }

  fn send(
    &self,
    request: RequestBuilder,
    url: &str,
  ) -> Result<Response, GithubError> {
    let request = match &self.settings.token {
      Some(token) => request.bearer_auth(token),
      None => request,
    };

    let response = request.send().map_err(|source| {
      GithubError::Request {
        url: url.to_string(),
        source,
      }
    })?;

    let status = response.status();
    if !status.is_success() {
      return Err(GithubError::Status {
        url:    url.to_string(),
        reason: status
          .canonical_reason()
          .map_or_else(|| status.as_str().to_string(), str::to_string),
      });
    }
    Ok(response)
  }
}

impl SnippetFetcher for GithubClient {
  fn fetch(
    &self,
    owner: &str,
    repo: &str,
    commit: &str,
    path: &str,
  ) -> Result<String, FetchError> {
    Ok(self.fetch_raw(owner, repo, commit, path)?)
  }
}

/// Start of the activity feed window: `today` minus `months`.
///
/// # Errors
///
/// Returns an error if the subtraction leaves jiff's supported range.
pub fn feed_since(today: Date, months: u32) -> Result<Date, GithubError> {
  Ok(today.checked_sub(i64::from(months).months())?)
}

/// Project name of a repository API URL: its last path segment.
#[must_use]
pub fn project_name(repository_url: &str) -> &str {
  repository_url
    .trim_end_matches('/')
    .rsplit('/')
    .next()
    .unwrap_or(repository_url)
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use jiff::civil::date;

  use super::*;

  #[test]
  fn project_name_is_last_segment() {
    assert_eq!(
      project_name("https://api.github.com/repos/rust-lang/rust"),
      "rust"
    );
    assert_eq!(project_name("https://api.github.com/repos/o/r/"), "r");
    assert_eq!(project_name("plain"), "plain");
  }

  #[test]
  fn feed_window_clamps_to_month_end() {
    assert_eq!(feed_since(date(2025, 3, 31), 1).unwrap(), date(2025, 2, 28));
    assert_eq!(feed_since(date(2025, 1, 15), 1).unwrap(), date(2024, 12, 15));
    assert_eq!(feed_since(date(2025, 1, 15), 0).unwrap(), date(2025, 1, 15));
  }

  #[test]
  fn status_error_names_url_and_reason() {
    let err = GithubError::Status {
      url:    "https://raw.example/o/r/main/x.rs".to_string(),
      reason: "Not Found".to_string(),
    };
    assert_eq!(
      err.to_string(),
      "Failed to fetch https://raw.example/o/r/main/x.rs: Not Found"
    );
  }
}
