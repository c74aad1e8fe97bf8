//! Type definitions for the Markdown processor.
//!
//! Contains all the core types used by the processor, including:
//! - Configuration options (`MarkdownOptions`)
//! - The main processor struct (`MarkdownProcessor`)
//! - AST transformation traits and implementations
//!
//! # Examples
//!
//! ```
//! use folio_commonmark::{MarkdownOptions, MarkdownProcessor};
//!
//! let options = MarkdownOptions {
//!   gfm: true,
//!   wasm_module: "/wasm/spirograph_wasm.js".to_string(),
//!   ..Default::default()
//! };
//!
//! let processor = MarkdownProcessor::new(options);
//! ```

use std::{collections::BTreeMap, sync::Arc};

use comrak::nodes::{AstNode, NodeHtmlBlock, NodeValue};

use crate::{
  codeblock::{
    CodeDisplay,
    SnippetFetcher,
    parse_code_block,
    resolve_github_block,
  },
  shortcode::{ShortcodeRegistry, WidgetContext, parse_shortcode},
};

/// Options for configuring the Markdown processor.
#[derive(Debug, Clone)]
pub struct MarkdownOptions {
  /// Enable GitHub Flavored Markdown (GFM) extensions.
  pub gfm: bool,

  /// URL of the spirograph WASM glue module, passed to widgets.
  pub wasm_module: String,

  /// Extra shortcodes: name to HTML template with `{{key}}` placeholders.
  pub shortcodes: BTreeMap<String, String>,
}

impl Default for MarkdownOptions {
  fn default() -> Self {
    Self {
      gfm:         cfg!(feature = "gfm"),
      wasm_module: "/wasm/spirograph_wasm.js".to_string(),
      shortcodes:  BTreeMap::new(),
    }
  }
}

/// Main Markdown processor.
///
/// Can be cheaply cloned and shared between threads; the registry and the
/// fetcher sit behind `Arc`.
#[derive(Clone)]
pub struct MarkdownProcessor {
  pub(crate) options:  MarkdownOptions,
  pub(crate) registry: Arc<ShortcodeRegistry>,
  pub(crate) fetcher:  Option<Arc<dyn SnippetFetcher>>,
}

impl std::fmt::Debug for MarkdownProcessor {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MarkdownProcessor")
      .field("options", &self.options)
      .field("registry", &self.registry)
      .field("fetcher", &self.fetcher.is_some())
      .finish()
  }
}

/// Trait for AST transformations (e.g., shortcode expansion).
pub trait AstTransformer {
  fn transform<'a>(&self, node: &'a AstNode<'a>);
}

/// Replace `node` with a raw HTML block and drop its children.
fn replace_with_html<'a>(node: &'a AstNode<'a>, html: String) {
  let children: Vec<_> = node.children().collect();
  for child in children {
    child.detach();
  }
  node.data.borrow_mut().value = NodeValue::HtmlBlock(NodeHtmlBlock {
    block_type: 0,
    literal:    html,
  });
}

/// AST transformer that turns shortcode paragraphs into widgets.
pub struct ShortcodeTransformer<'r> {
  pub registry: &'r ShortcodeRegistry,
  pub context:  &'r WidgetContext,
}

impl AstTransformer for ShortcodeTransformer<'_> {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    let paragraphs: Vec<_> = node
      .descendants()
      .filter(|n| matches!(n.data.borrow().value, NodeValue::Paragraph))
      .collect();

    for paragraph in paragraphs {
      let Some(text) = paragraph_text(paragraph) else {
        continue;
      };
      if let Some(shortcode) = parse_shortcode(&text) {
        log::trace!("Expanding shortcode {}", shortcode.name);
        let html = self.registry.render(&shortcode, self.context);
        replace_with_html(paragraph, format!("{html}\n"));
      }
    }
  }
}

/// Plain text of a paragraph made only of text runs.
///
/// Returns `None` when the paragraph holds anything else, such as emphasis,
/// inline code or images. A shortcode must sit on one line, so line breaks
/// disqualify the paragraph too.
fn paragraph_text<'a>(node: &'a AstNode<'a>) -> Option<String> {
  let mut text = String::new();
  for child in node.children() {
    match &child.data.borrow().value {
      NodeValue::Text(t) => text.push_str(t),
      // Autolinked URLs inside prop values.
      NodeValue::Link(..) => text.push_str(&super::extract_inline_text(child)),
      _ => return None,
    }
  }
  Some(text)
}

/// AST transformer that renders fenced code blocks as code displays.
///
/// Fences without an info string are left to the default renderer.
pub struct CodeBlockTransformer<'r> {
  pub fetcher: &'r dyn SnippetFetcher,
}

impl AstTransformer for CodeBlockTransformer<'_> {
  fn transform<'a>(&self, node: &'a AstNode<'a>) {
    let blocks: Vec<_> = node
      .descendants()
      .filter(|n| {
        matches!(&n.data.borrow().value, NodeValue::CodeBlock(block)
          if block.fenced && !block.info.trim().is_empty())
      })
      .collect();

    for block in blocks {
      let (info, literal) = match &block.data.borrow().value {
        NodeValue::CodeBlock(code) => (code.info.clone(), code.literal.clone()),
        _ => continue,
      };
      let language = info.split_whitespace().next().unwrap_or_default();

      let snippets = if language == "github" {
        resolve_github_block(&literal, self.fetcher)
      } else {
        parse_code_block(language, &literal)
      };
      replace_with_html(block, CodeDisplay::new(&snippets).render());
    }
  }
}

/// Builder for constructing `MarkdownOptions` with method chaining.
#[derive(Debug, Clone)]
pub struct MarkdownOptionsBuilder {
  options: MarkdownOptions,
}

impl MarkdownOptionsBuilder {
  /// Create a new builder with default options.
  #[must_use]
  pub fn new() -> Self {
    Self {
      options: MarkdownOptions::default(),
    }
  }

  /// Enable or disable GitHub Flavored Markdown.
  #[must_use]
  pub const fn gfm(mut self, enabled: bool) -> Self {
    self.options.gfm = enabled;
    self
  }

  /// Set the spirograph WASM module URL.
  #[must_use]
  pub fn wasm_module<S: Into<String>>(mut self, url: S) -> Self {
    self.options.wasm_module = url.into();
    self
  }

  /// Add a template shortcode.
  #[must_use]
  pub fn shortcode<N: Into<String>, H: Into<String>>(
    mut self,
    name: N,
    html: H,
  ) -> Self {
    self.options.shortcodes.insert(name.into(), html.into());
    self
  }

  /// Add several template shortcodes at once.
  #[must_use]
  pub fn shortcodes<I>(mut self, shortcodes: I) -> Self
  where
    I: IntoIterator<Item = (String, String)>,
  {
    self.options.shortcodes.extend(shortcodes);
    self
  }

  /// Build the final `MarkdownOptions`.
  #[must_use]
  pub fn build(self) -> MarkdownOptions {
    self.options
  }
}

impl Default for MarkdownOptionsBuilder {
  fn default() -> Self {
    Self::new()
  }
}
