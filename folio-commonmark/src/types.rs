//! Types for folio-commonmark public API and internal use.
use serde::{Deserialize, Serialize};

use crate::frontmatter::FrontMatter;

/// Represents a header in a Markdown document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Header {
  /// Header text as written after the leading `#` markers.
  pub text:  String,
  /// Header level (1-6).
  pub level: u8,
  /// Anchor ID generated from the header text.
  pub id:    String,
}

/// Result of Markdown processing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarkdownResult {
  /// Rendered HTML output.
  pub html: String,

  /// Extracted headers (for `ToC`, navigation, etc).
  pub headers: Vec<Header>,

  /// Title of the document: front matter title, else the first H1.
  pub title: Option<String>,

  /// Parsed front matter attributes. Default when the document has none.
  pub front_matter: FrontMatter,
}
