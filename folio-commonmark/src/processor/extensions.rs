//! HTML post-processing applied after comrak has rendered a document.
use std::sync::LazyLock;

use regex::Regex;

use super::process::process_safe;
use crate::utils;

/// Give every `<h1>`..`<h6>` an `id` derived from its visible text.
///
/// Headings that already carry attributes are left alone, as are headings
/// whose text slugifies to nothing.
#[must_use]
pub fn add_heading_ids(html: &str) -> String {
  static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    utils::compile_or_never(r"<h([1-6])>(.*?)</h([1-6])>", "HEADING_RE")
  });

  process_safe(
    html,
    |html| {
      HEADING_RE
        .replace_all(html, |caps: &regex::Captures| {
          let level = &caps[1];
          let inner = &caps[2];
          if level != &caps[3] {
            return caps[0].to_string();
          }
          let id = utils::slugify(&utils::strip_tags(inner));
          if id.is_empty() {
            caps[0].to_string()
          } else {
            format!("<h{level} id=\"{id}\">{inner}</h{level}>")
          }
        })
        .into_owned()
    },
    html,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn ids_follow_visible_text() {
    let html = "<h2>Getting <em>Started</em></h2>\n<p>x</p>\n<h3>Step 1</h3>";
    let out = add_heading_ids(html);
    assert!(out.contains("<h2 id=\"getting-started\">Getting <em>Started</em></h2>"));
    assert!(out.contains("<h3 id=\"step-1\">Step 1</h3>"));
  }

  #[test]
  fn punctuation_only_heading_has_no_id() {
    assert_eq!(add_heading_ids("<h2>?!</h2>"), "<h2>?!</h2>");
  }

  #[test]
  fn code_in_heading_is_decoded_before_slugging() {
    let out = add_heading_ids("<h2>Using <code>Vec&lt;T&gt;</code></h2>");
    assert!(out.starts_with("<h2 id=\"using-vect\">"));
  }
}
