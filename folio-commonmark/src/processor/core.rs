//! Core implementation of the Markdown processor.
//!
//! This module contains the main implementation of `MarkdownProcessor` and its
//! methods, focused on the core rendering pipeline and configuration
//! management.
use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use comrak::{
  Arena,
  nodes::{AstNode, NodeValue},
  options::Options,
  parse_document,
};
use log::{trace, warn};
use walkdir::WalkDir;

use super::{
  extensions::add_heading_ids,
  types::{
    AstTransformer,
    CodeBlockTransformer,
    MarkdownOptions,
    MarkdownProcessor,
    ShortcodeTransformer,
  },
};
use crate::{
  codeblock::{OfflineFetcher, SnippetFetcher},
  frontmatter::{FrontMatter, parse_front_matter, split_front_matter},
  shortcode::{ShortcodeRegistry, WidgetContext},
  types::MarkdownResult,
  utils,
};

impl MarkdownProcessor {
  /// Create a new `MarkdownProcessor` with the given options.
  ///
  /// The built-in widgets are registered first, so a configured shortcode
  /// with the same name replaces them.
  #[must_use]
  pub fn new(options: MarkdownOptions) -> Self {
    let mut registry = ShortcodeRegistry::with_builtins();
    for (name, html) in &options.shortcodes {
      registry.register_template(name.clone(), html.clone());
    }

    Self {
      options,
      registry: Arc::new(registry),
      fetcher: None,
    }
  }

  /// Use `fetcher` to resolve `github` code blocks.
  ///
  /// Without one, remote files are reported as unavailable.
  #[must_use]
  pub fn with_fetcher(mut self, fetcher: Arc<dyn SnippetFetcher>) -> Self {
    self.fetcher = Some(fetcher);
    self
  }

  /// Access processor options.
  #[must_use]
  pub const fn options(&self) -> &MarkdownOptions {
    &self.options
  }

  /// Access the shortcode registry.
  #[must_use]
  pub fn registry(&self) -> &ShortcodeRegistry {
    &self.registry
  }

  /// Render a post: front matter, headings, title and HTML.
  ///
  /// A malformed front matter block is logged and replaced by default
  /// attributes; the body is still rendered.
  #[must_use]
  pub fn render(&self, markdown: &str) -> MarkdownResult {
    let (front_matter, body) = match parse_front_matter(markdown) {
      Ok(doc) => (doc.attributes, doc.body),
      Err(e) => {
        warn!("Ignoring front matter: {e}");
        (FrontMatter::default(), split_front_matter(markdown).1)
      },
    };

    let mut result = self.render_body(body);
    if let Some(title) = &front_matter.title {
      result.title = Some(title.clone());
    }
    result.front_matter = front_matter;
    result
  }

  /// Render Markdown that has no front matter, such as a pull request body.
  #[must_use]
  pub fn render_body(&self, markdown: &str) -> MarkdownResult {
    let headers = utils::extract_headings(markdown);
    let title = utils::first_h1(&headers);
    let html = self.convert_to_html(markdown);

    MarkdownResult {
      html,
      headers,
      title,
      front_matter: FrontMatter::default(),
    }
  }

  /// Convert markdown to HTML using comrak and configured options.
  fn convert_to_html(&self, content: &str) -> String {
    let arena = Arena::new();
    let options = comrak_options(self.options.gfm, true);
    let root = parse_document(&arena, content, &options);

    let context = WidgetContext {
      wasm_module: self.options.wasm_module.clone(),
    };
    ShortcodeTransformer {
      registry: &self.registry,
      context:  &context,
    }
    .transform(root);

    let fetcher: &dyn SnippetFetcher =
      self.fetcher.as_deref().unwrap_or(&OfflineFetcher);
    CodeBlockTransformer { fetcher }.transform(root);

    let mut html_output = String::new();
    if let Err(e) = comrak::format_html(root, &options, &mut html_output) {
      warn!("Failed to format HTML: {e}");
    }

    add_heading_ids(&html_output)
  }
}

/// Build comrak options.
///
/// With `raw_html` off, inline and block HTML is replaced by a comment and
/// dangerous link schemes are dropped. Heading ids are added after
/// rendering so they match the TOC slugs.
pub(crate) fn comrak_options(gfm: bool, raw_html: bool) -> Options<'static> {
  let mut options = Options::default();
  if gfm {
    options.extension.table = true;
    options.extension.footnotes = true;
    options.extension.strikethrough = true;
    options.extension.tasklist = true;
    options.extension.autolink = true;
  }
  options.render.r#unsafe = raw_html;
  options
}

/// Extract all inline text from a node.
pub fn extract_inline_text<'a>(node: &'a AstNode<'a>) -> String {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      NodeValue::Code(t) => text.push_str(&t.literal),
      NodeValue::SoftBreak | NodeValue::LineBreak => text.push(' '),
      NodeValue::Link(..)
      | NodeValue::Emph
      | NodeValue::Strong
      | NodeValue::Strikethrough => text.push_str(&extract_inline_text(child)),
      _ => {},
    }
  }
  text
}

/// Collect all markdown files from the input directory, sorted by path.
pub fn collect_markdown_files(input_dir: &Path) -> Vec<PathBuf> {
  let mut files = Vec::with_capacity(100);

  for entry in WalkDir::new(input_dir)
    .follow_links(true)
    .sort_by_file_name()
    .into_iter()
    .filter_map(Result::ok)
  {
    let path = entry.path();
    if path.is_file() && path.extension().is_some_and(|ext| ext == "md") {
      files.push(path.to_owned());
    }
  }

  trace!("Found {} markdown files to process", files.len());
  files
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn collect_finds_nested_markdown_only() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("2025")).unwrap();
    std::fs::write(dir.path().join("b.md"), "# B").unwrap();
    std::fs::write(dir.path().join("2025/a.md"), "# A").unwrap();
    std::fs::write(dir.path().join("notes.txt"), "x").unwrap();

    let files = collect_markdown_files(dir.path());
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f.extension().unwrap() == "md"));
  }

  #[test]
  fn bad_front_matter_keeps_body() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    let result = processor.render("---\ntitle: [oops\n---\n# Real Title\n");
    assert_eq!(result.front_matter, FrontMatter::default());
    assert_eq!(result.title.as_deref(), Some("Real Title"));
    assert!(!result.html.contains("oops"));
  }

  #[test]
  fn front_matter_title_wins_over_h1() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    let result = processor.render("---\ntitle: From YAML\n---\n# From Body\n");
    assert_eq!(result.title.as_deref(), Some("From YAML"));
    assert_eq!(result.headers.len(), 1);
  }
}
