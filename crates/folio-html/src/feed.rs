//! The pull request activity feed on the home page.
use folio_commonmark::{MarkdownOptions, processor::process_markdown_string};
use folio_github::{GithubError, PullRequest, project_name};
use log::warn;

/// One pull request card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrCard {
  pub project:   String,
  pub number:    u64,
  pub title:     String,
  pub html_url:  String,
  /// Body rendered as Markdown, if the pull request has one.
  pub body_html: Option<String>,
}

impl PrCard {
  #[must_use]
  pub fn from_pull_request(pr: &PullRequest, options: &MarkdownOptions) -> Self {
    let body_html = pr
      .body
      .as_deref()
      .filter(|body| !body.trim().is_empty())
      .map(|body| process_markdown_string(body, options).html);

    Self {
      project: project_name(&pr.repository_url).to_string(),
      number: pr.number,
      title: pr.title.clone(),
      html_url: pr.html_url.clone(),
      body_html,
    }
  }
}

/// State of the feed for one build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Feed {
  /// No GitHub user configured, or the build is offline.
  #[default]
  Disabled,
  Loaded(Vec<PrCard>),
  /// The search failed; the message is shown in place of the cards.
  Failed(String),
}

impl Feed {
  /// Turn a search result into a feed, logging a failure.
  #[must_use]
  pub fn from_search(
    result: Result<Vec<PullRequest>, GithubError>,
    options: &MarkdownOptions,
  ) -> Self {
    match result {
      Ok(items) => {
        Self::Loaded(
          items
            .iter()
            .map(|pr| PrCard::from_pull_request(pr, options))
            .collect(),
        )
      },
      Err(e) => {
        warn!("Failed to load pull request feed: {e}");
        Self::Failed(format!("Could not load recent pull requests ({e})."))
      },
    }
  }

  #[must_use]
  pub const fn is_enabled(&self) -> bool {
    !matches!(self, Self::Disabled)
  }
}
