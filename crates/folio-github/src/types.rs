use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// One item of the issue search API, reduced to what the feed shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
  pub id:             u64,
  pub number:         u64,
  pub title:          String,
  #[serde(default)]
  pub body:           Option<String>,
  pub html_url:       String,
  /// API URL of the repository, e.g. `https://api.github.com/repos/o/r`.
  pub repository_url: String,
  #[serde(default)]
  pub state:          String,
  #[serde(default)]
  pub updated_at:     Option<Timestamp>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
  #[serde(default)]
  pub items: Vec<PullRequest>,
}
