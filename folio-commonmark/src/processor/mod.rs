//! Markdown processing module with modular organization.
//!
//! # Architecture
//!
//! The processor module is organized into focused submodules:
//!
//! - [`core`]: Main processor implementation and processing pipeline
//! - [`process`]: High-level processing functions with error recovery
//! - [`extensions`]: HTML post-processing such as heading anchors
//! - [`types`]: Core type definitions, options and AST transformers
pub mod core;
pub mod extensions;
pub mod process;
pub mod types;

pub use core::{collect_markdown_files, extract_inline_text};

pub use extensions::add_heading_ids;
pub use process::{
  process_markdown_string,
  process_safe,
  process_with_recovery,
};
pub use types::{
  AstTransformer,
  CodeBlockTransformer,
  MarkdownOptions,
  MarkdownOptionsBuilder,
  MarkdownProcessor,
  ShortcodeTransformer,
};

#[cfg(test)]
mod tests {
  use super::{MarkdownOptions, MarkdownOptionsBuilder, MarkdownProcessor};

  #[test]
  fn test_builder_registers_template_shortcodes() {
    let options = MarkdownOptionsBuilder::new()
      .shortcode("Note", "<aside>{{text}}</aside>")
      .build();
    let processor = MarkdownProcessor::new(options);
    assert!(processor.options().shortcodes.contains_key("Note"));
    assert!(processor.registry().contains("Note"));
    assert!(processor.registry().contains("Spirograph"));

    let result = processor.render("[[Note text=\"hi\"]]\n");
    assert!(result.html.contains("<aside>hi</aside>"));
    assert!(!result.html.contains("<p>"));
  }

  #[test]
  fn test_shortcode_inside_sentence_is_text() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    let result = processor.render("Try [[Spirograph]] now.\n");
    assert!(result.html.contains("<p>Try [[Spirograph]] now.</p>"));
  }

  #[test]
  fn test_shortcode_split_over_lines_is_text() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    let result = processor.render("[[Spirograph\nspeed=2]]\n");
    assert!(!result.html.contains("data-widget"));
    assert!(result.html.contains("<p>[[Spirograph\nspeed=2]]</p>"));
  }

  #[test]
  fn test_shortcode_in_code_is_untouched() {
    let processor = MarkdownProcessor::new(MarkdownOptions::default());
    let result = processor.render("```\n[[Spirograph]]\n```\n");
    assert!(result.html.contains("<pre><code>[[Spirograph]]\n</code></pre>"));
    assert!(!result.html.contains("data-widget"));
  }

  #[test]
  fn test_gfm_tables_render() {
    let options = MarkdownOptionsBuilder::new().gfm(true).build();
    let processor = MarkdownProcessor::new(options);
    let result = processor.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
    assert!(result.html.contains("<table>"));
  }
}
