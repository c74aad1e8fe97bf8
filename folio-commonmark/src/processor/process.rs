//! Main processing functions for Markdown content.
use log::error;

use super::{
  core::comrak_options,
  extensions::add_heading_ids,
  types::{MarkdownOptions, MarkdownProcessor},
};
use crate::{frontmatter::FrontMatter, types::MarkdownResult, utils};

/// Process markdown content with error recovery.
///
/// Attempts to process the markdown content and falls back to an inline
/// error message if rendering panics.
///
/// # Arguments
///
/// * `processor` - The configured markdown processor
/// * `content` - The raw markdown content to process
///
/// # Returns
///
/// A `MarkdownResult` with processed HTML, headers, title and front matter
#[must_use]
pub fn process_with_recovery(
  processor: &MarkdownProcessor,
  content: &str,
) -> MarkdownResult {
  match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    processor.render(content)
  })) {
    Ok(result) => result,
    Err(panic_err) => {
      error!("Panic during markdown processing: {panic_err:?}");
      error_result()
    },
  }
}

fn error_result() -> MarkdownResult {
  MarkdownResult {
    html:         "<div class=\"error\">Critical error processing markdown \
                   content</div>"
      .to_string(),
    headers:      Vec::new(),
    title:        None,
    front_matter: FrontMatter::default(),
  }
}

/// Safely process markup content with error recovery.
///
/// Provides a safe wrapper around markup processing operations
/// that may fail, and ensures that partial or fallback content is returned
/// rather than complete failure.
///
/// # Arguments
///
/// * `content` - The content to process
/// * `processor_fn` - The processing function to apply
/// * `fallback` - Fallback content to use if processing fails
///
/// # Returns
///
/// The processed content or fallback on error
pub fn process_safe<F>(content: &str, processor_fn: F, fallback: &str) -> String
where
  F: FnOnce(&str) -> String,
{
  // Avoid processing empty strings
  if content.is_empty() {
    return String::new();
  }

  let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    processor_fn(content)
  }));

  match result {
    Ok(processed_text) => processed_text,
    Err(e) => {
      if let Some(error_msg) = e.downcast_ref::<String>() {
        error!("Error processing markup: {error_msg}");
      } else if let Some(error_msg) = e.downcast_ref::<&str>() {
        error!("Error processing markup: {error_msg}");
      } else {
        error!("Unknown error occurred while processing markup");
      }

      if fallback.is_empty() {
        content.to_string()
      } else {
        fallback.to_string()
      }
    },
  }
}

/// Render untrusted Markdown, such as a pull request body.
///
/// Only CommonMark plus the GFM extensions from `options` apply: raw HTML
/// is omitted, and shortcodes and code displays are left as plain text and
/// code. There is no front matter handling, so a leading `---` is a
/// thematic break.
#[must_use]
pub fn process_markdown_string(
  content: &str,
  options: &MarkdownOptions,
) -> MarkdownResult {
  match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
    render_untrusted(content, options.gfm)
  })) {
    Ok(result) => result,
    Err(panic_err) => {
      error!("Panic during markdown processing: {panic_err:?}");
      error_result()
    },
  }
}

fn render_untrusted(content: &str, gfm: bool) -> MarkdownResult {
  let headers = utils::extract_headings(content);
  let title = utils::first_h1(&headers);
  let html =
    comrak::markdown_to_html(content, &comrak_options(gfm, false));

  MarkdownResult {
    html: add_heading_ids(&html),
    headers,
    title,
    front_matter: FrontMatter::default(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_safely_process_markup_success() {
    let content = "test content";
    let result =
      process_safe(content, |s| format!("processed: {s}"), "fallback");
    assert_eq!(result, "processed: test content");
  }

  #[test]
  #[allow(clippy::panic)]
  fn test_safely_process_markup_fallback() {
    let content = "test content";
    let result = process_safe(content, |_| panic!("test panic"), "fallback");
    assert_eq!(result, "fallback");
  }

  #[test]
  fn test_process_markdown_string_keeps_leading_rule() {
    let content = "---\nnot: yaml\n---\n\nSome **bold** text.";
    let result = process_markdown_string(content, &MarkdownOptions::default());

    assert!(result.html.contains("<hr />"));
    assert!(result.html.contains("<strong>bold</strong>"));
    assert_eq!(result.front_matter, FrontMatter::default());
  }

  #[test]
  fn test_process_markdown_string_omits_raw_html() {
    let content = "Fixes it <script>alert(document.cookie)</script>\n\n<img \
                   src=x onerror=alert(1)>\n\n[link](javascript:alert(1))\n";
    let result = process_markdown_string(content, &MarkdownOptions::default());

    assert!(!result.html.contains("<script>"));
    assert!(!result.html.contains("onerror"));
    assert!(!result.html.contains("javascript:"));
    assert!(result.html.contains("Fixes it"));
  }

  #[test]
  fn test_process_markdown_string_skips_widgets() {
    let content = "[[Spirograph]]\n\n```github\n{\"repo\": \"a/b\"}\n```\n";
    let result = process_markdown_string(content, &MarkdownOptions::default());

    assert!(!result.html.contains("data-widget"));
    assert!(!result.html.contains("code-display"));
    assert!(result.html.contains("[[Spirograph]]"));
    assert!(result.html.contains("<code class=\"language-github\">"));
  }

  #[test]
  fn test_process_with_recovery_renders() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    let result = process_with_recovery(&processor, "# Test Header\n\nBody.");
    assert!(result.html.contains("<h1 id=\"test-header\">Test Header</h1>"));
    assert_eq!(result.html.matches("id=").count(), 1);
    assert_eq!(result.title, Some("Test Header".to_string()));
  }
}
