//! # folio-commonmark
//!
//! The content pipeline behind the folio blog: Markdown posts with front
//! matter, shortcode widgets and multi-file code displays, rendered to HTML
//! with `comrak`.
//!
//! ## Quick Start
//!
//! ```rust
//! use folio_commonmark::{MarkdownOptions, MarkdownProcessor};
//!
//! let processor = MarkdownProcessor::new(MarkdownOptions::default());
//! let result = processor.render("---\ntitle: Hello\n---\n## World\n");
//!
//! assert_eq!(result.title.as_deref(), Some("Hello"));
//! assert_eq!(result.headers[0].id, "world");
//! ```
//!
//! ## Features
//!
//! - **Front matter** in YAML: title, subtitle, `publishedOn`, cover image
//! - **Header extraction** with slug anchors that match the rendered ids
//! - **Shortcodes** (`[[Spirograph speed=2]]`) expanded into widgets
//! - **Code displays**: tabbed multi-file fences, `#@title=` properties and
//!   files fetched from GitHub through a pluggable [`SnippetFetcher`]
//! - **Error recovery** with graceful degradation for malformed input

pub mod codeblock;
pub mod frontmatter;
pub mod processor;
pub mod shortcode;
mod types;
pub mod utils;

pub use crate::{
  codeblock::{CodeDisplay, CodeSnippet, OfflineFetcher, SnippetFetcher},
  frontmatter::{CoverImage, FrontMatter, FrontMatterError},
  processor::{AstTransformer, MarkdownOptions, MarkdownProcessor},
  shortcode::{Shortcode, ShortcodeRegistry},
  types::{Header, MarkdownResult},
};
