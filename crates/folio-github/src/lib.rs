//! Blocking GitHub access for folio.
//!
//! Two endpoints are used: raw file contents for `github` code blocks, and
//! the issue search API for the pull request activity feed. Both base URLs
//! are configurable so a mirror or a mock server can stand in for GitHub.
pub mod client;
pub mod error;
pub mod types;

pub use crate::{
  client::{GithubClient, GithubSettings, feed_since, project_name},
  error::GithubError,
  types::PullRequest,
};
