//! Front matter extraction for blog posts.
//!
//! A post may start with a YAML block fenced by `---` lines:
//!
//! ```markdown
//! ---
//! title: Drawing with WebAssembly
//! subtitle: Spirographs in the browser
//! publishedOn: 2025-03-14
//! coverImage:
//!   src: /images/cover.jpg
//!   alt: A spirograph
//!   source: SomeUser
//! ---
//!
//! # Body starts here
//! ```
use std::{collections::BTreeMap, str::FromStr};

use jiff::{Timestamp, civil};
use serde::{Deserialize, Deserializer, Serialize};

/// Errors produced while reading a front matter block.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
  #[error("Invalid front matter YAML: {0}")]
  Yaml(#[from] yaml_serde::Error),

  #[error("Invalid publishedOn date '{value}': expected YYYY-MM-DD")]
  Date { value: String },
}

/// Cover image shown at the top of a post.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CoverImage {
  pub src:    String,
  #[serde(default)]
  pub alt:    String,
  /// Wikimedia Commons user credited for the image.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source: Option<String>,
}

/// Post attributes declared in front matter.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FrontMatter {
  pub title: Option<String>,

  pub subtitle: Option<String>,

  #[serde(deserialize_with = "deserialize_date")]
  pub published_on: Option<civil::Date>,

  pub cover_image: Option<CoverImage>,

  /// Keys this crate does not interpret, kept for templates.
  #[serde(flatten)]
  pub extra: BTreeMap<String, serde_json::Value>,
}

/// A Markdown document split into attributes and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document<'a> {
  pub attributes: FrontMatter,
  pub body:       &'a str,
  /// Number of source lines taken up by the front matter block.
  pub body_line:  usize,
}

/// Split a front matter block off the top of `content`.
///
/// Returns `(yaml, body, lines_consumed)`. When the document does not open
/// with a fence, or the fence is never closed, the whole input is the body.
#[must_use]
pub fn split_front_matter(content: &str) -> (Option<&str>, &str, usize) {
  let content_start = content.strip_prefix('\u{feff}').unwrap_or(content);
  let mut lines = content_start.split_inclusive('\n');

  let Some(opener) = lines.next() else {
    return (None, content, 0);
  };
  if !is_opening_fence(opener.trim_end()) {
    return (None, content, 0);
  }

  let yaml_start = opener.len();
  let mut offset = yaml_start;
  let mut line_count = 1;

  for line in lines {
    line_count += 1;
    let bare = line.trim_end();
    if bare == "---" || bare == "..." {
      let yaml = &content_start[yaml_start..offset];
      let body = &content_start[offset + line.len()..];
      return (Some(yaml), body, line_count);
    }
    offset += line.len();
  }

  (None, content, 0)
}

fn is_opening_fence(line: &str) -> bool {
  line == "---" || line == "---yaml" || line == "= yaml ="
}

/// Parse the front matter of `content`.
///
/// # Errors
///
/// Returns an error if the YAML block is malformed or `publishedOn` is not a
/// recognisable date.
pub fn parse_front_matter(
  content: &str,
) -> Result<Document<'_>, FrontMatterError> {
  let (yaml, body, body_line) = split_front_matter(content);

  let attributes = match yaml {
    Some(yaml) if !yaml.trim().is_empty() => yaml_serde::from_str(yaml)?,
    _ => FrontMatter::default(),
  };

  Ok(Document {
    attributes,
    body,
    body_line,
  })
}

/// Parse a `publishedOn` value.
///
/// Accepts a plain date, a civil datetime or an RFC 3339 timestamp. Time and
/// offset information is discarded; posts are dated by calendar day.
///
/// # Errors
///
/// Returns [`FrontMatterError::Date`] if none of the formats match.
pub fn parse_published_on(value: &str) -> Result<civil::Date, FrontMatterError> {
  let value = value.trim();
  if let Ok(date) = civil::Date::from_str(value) {
    return Ok(date);
  }
  if let Ok(datetime) = civil::DateTime::from_str(value) {
    return Ok(datetime.date());
  }
  if let Ok(timestamp) = Timestamp::from_str(value) {
    return Ok(timestamp.to_zoned(jiff::tz::TimeZone::UTC).date());
  }
  Err(FrontMatterError::Date {
    value: value.to_string(),
  })
}

fn deserialize_date<'de, D>(
  deserializer: D,
) -> Result<Option<civil::Date>, D::Error>
where
  D: Deserializer<'de>,
{
  let raw: Option<String> = Option::deserialize(deserializer)?;
  raw
    .map(|value| parse_published_on(&value).map_err(serde::de::Error::custom))
    .transpose()
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  const POST: &str = "---\ntitle: Hello\nsubtitle: World\npublishedOn: \
                      2025-03-14\ncoverImage:\n  src: /c.jpg\n  alt: Cover\n  \
                      source: Someone\ntags: [rust]\n---\n# Body\n";

  #[test]
  fn split_returns_yaml_and_body() {
    let (yaml, body, lines) = split_front_matter(POST);
    assert!(yaml.unwrap().contains("title: Hello"));
    assert_eq!(body, "# Body\n");
    assert_eq!(lines, 10);
  }

  #[test]
  fn no_front_matter_is_all_body() {
    let (yaml, body, lines) = split_front_matter("# Just a post\n");
    assert!(yaml.is_none());
    assert_eq!(body, "# Just a post\n");
    assert_eq!(lines, 0);
  }

  #[test]
  fn unclosed_block_is_all_body() {
    let content = "---\ntitle: Oops\n# Body\n";
    let (yaml, body, _) = split_front_matter(content);
    assert!(yaml.is_none());
    assert_eq!(body, content);
  }

  #[test]
  fn alternative_openers_are_accepted() {
    let (yaml, body, lines) = split_front_matter("---yaml\ntitle: a\n---\nbody");
    assert_eq!(yaml, Some("title: a\n"));
    assert_eq!(body, "body");
    assert_eq!(lines, 3);

    let (yaml, body, _) = split_front_matter("= yaml =\ntitle: b\n...\nbody");
    assert_eq!(yaml, Some("title: b\n"));
    assert_eq!(body, "body");
  }

  #[test]
  fn alternative_openers_parse() {
    let doc = parse_front_matter("= yaml =\ntitle: Fenced\n---\n# Body\n").unwrap();
    assert_eq!(doc.attributes.title.as_deref(), Some("Fenced"));
    assert_eq!(doc.body, "# Body\n");

    let doc = parse_front_matter("---yaml\nsubtitle: Sub\n---\n").unwrap();
    assert_eq!(doc.attributes.subtitle.as_deref(), Some("Sub"));
    assert_eq!(doc.body, "");
  }

  #[test]
  fn dots_close_the_block() {
    let (yaml, body, _) = split_front_matter("---\ntitle: x\n...\nrest");
    assert_eq!(yaml, Some("title: x\n"));
    assert_eq!(body, "rest");
  }

  #[test]
  fn parses_all_attributes() {
    let doc = parse_front_matter(POST).unwrap();
    let attrs = doc.attributes;
    assert_eq!(attrs.title.as_deref(), Some("Hello"));
    assert_eq!(attrs.subtitle.as_deref(), Some("World"));
    assert_eq!(attrs.published_on, Some(civil::date(2025, 3, 14)));
    let cover = attrs.cover_image.unwrap();
    assert_eq!(cover.src, "/c.jpg");
    assert_eq!(cover.source.as_deref(), Some("Someone"));
    assert!(attrs.extra.contains_key("tags"));
  }

  #[test]
  fn empty_block_gives_defaults() {
    let doc = parse_front_matter("---\n---\nbody").unwrap();
    assert_eq!(doc.attributes, FrontMatter::default());
    assert_eq!(doc.body, "body");
  }

  #[test]
  fn malformed_yaml_is_an_error() {
    let result = parse_front_matter("---\ntitle: [unclosed\n---\nbody");
    assert!(matches!(result, Err(FrontMatterError::Yaml(_))));
  }

  #[test]
  fn published_on_formats() {
    let expected = civil::date(2024, 12, 1);
    assert_eq!(parse_published_on("2024-12-01").unwrap(), expected);
    assert_eq!(parse_published_on("2024-12-01T10:30:00").unwrap(), expected);
    assert_eq!(parse_published_on("2024-12-01T10:30:00Z").unwrap(), expected);
    assert!(parse_published_on("December 1st").is_err());
  }
}
