use thiserror::Error;

#[derive(Debug, Error)]
pub enum GithubError {
  #[error("Failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("Failed to fetch {url}: {reason}")]
  Status { url: String, reason: String },

  #[error("Request to {url} failed: {source}")]
  Request {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("Invalid response from {url}: {source}")]
  Decode {
    url:    String,
    #[source]
    source: reqwest::Error,
  },

  #[error("Invalid feed window: {0}")]
  Window(#[from] jiff::Error),
}
