#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
use folio_commonmark::{MarkdownOptions, MarkdownProcessor};

/// A post exercising every extension at once.
const POST: &str = r#"---
title: Drawing with WebAssembly
subtitle: Spirographs in the browser
publishedOn: 2025-03-14
coverImage:
  src: /images/cover.jpg
  alt: A spirograph
  source: SomeUser
---

# Drawing with WebAssembly

Some **bold** text with `inline code`.

## Setup

```rust|toml
#@title=src/lib.rs

pub fn draw() {}

---

#@title=Cargo.toml
[package]
name = "spiro"
```

## The Demo

[[Spirograph speed=2 label="Spin it"]]

### Unknown widgets

[[Nope]]

```
# plain fence, not a heading
```
"#;

#[test]
fn test_full_post() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let result = processor.render(POST);

  assert_eq!(result.title.as_deref(), Some("Drawing with WebAssembly"));
  assert_eq!(
    result.front_matter.subtitle.as_deref(),
    Some("Spirographs in the browser")
  );

  let ids: Vec<_> = result.headers.iter().map(|h| h.id.as_str()).collect();
  assert_eq!(ids, vec![
    "drawing-with-webassembly",
    "setup",
    "the-demo",
    "unknown-widgets"
  ]);

  let html = &result.html;
  assert!(html.contains("<h2 id=\"setup\">Setup</h2>"), "{html}");
  assert!(html.contains("<h3 id=\"unknown-widgets\">"));
  assert!(html.contains("code-tabbed"));
  assert!(html.contains(">src/lib.rs</button>"));
  assert!(html.contains("<code class=\"language-toml\">"));
  assert!(html.contains("data-widget=\"spirograph\""));
  assert!(html.contains("data-label=\"Spin it\""));
  assert!(html.contains("Unknown shortcode: Nope"));
  assert!(html.contains("<pre><code># plain fence, not a heading\n</code></pre>"));
  assert!(!html.contains("publishedOn"));
}

#[test]
fn test_toc_ids_match_rendered_ids() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let result = processor.render(POST);
  for header in &result.headers {
    let needle = format!("id=\"{}\"", header.id);
    assert!(
      result.html.contains(&needle),
      "rendered HTML is missing {needle}"
    );
  }
}

#[test]
fn test_offline_github_block() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let markdown = "```github\n{\"repo\": \"me/site\", \"commit\": \"abc\", \
                  \"files\": [{\"file\": \"src/main.rs\"}]}\n```\n";
  let result = processor.render(markdown);
  assert!(result.html.contains("// Error loading file:"));
  assert!(result.html.contains("abc | me/site"));
}

#[test]
fn test_html_in_code_is_escaped() {
  let processor = MarkdownProcessor::new(MarkdownOptions::default());
  let result = processor.render("```html\n<script>alert(1)</script>\n```\n");
  assert!(result.html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
  assert!(!result.html.contains("<script>alert"));
}
