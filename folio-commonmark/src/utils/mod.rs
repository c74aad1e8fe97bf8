use std::sync::LazyLock;

pub mod fence;

use regex::Regex;

pub use self::fence::FenceTracker;
use crate::types::Header;

/// Slugify a string for use as an anchor ID.
///
/// Lowercases the text, drops everything that is not an ASCII word
/// character, whitespace or `-`, then turns each run of whitespace and
/// dashes into a single `-`. Leading and trailing dashes are kept so that
/// ids stay stable with what the client-side router expects.
#[must_use]
pub fn slugify(text: &str) -> String {
  let lowered = text.to_lowercase();
  let mut slug = String::with_capacity(lowered.len());
  let mut in_separator = false;

  for c in lowered.chars() {
    if c.is_whitespace() || c == '-' {
      if !in_separator {
        slug.push('-');
        in_separator = true;
      }
    } else if c.is_ascii_alphanumeric() || c == '_' {
      slug.push(c);
      in_separator = false;
    }
    // Dropped characters do not end a separator run.
  }

  slug
}

/// Extract ATX headings from raw Markdown for the table of contents.
///
/// Fenced code, HTML lines and `#@key=value` code properties are skipped.
/// Every other line that begins with `#` in the first column is a heading,
/// whether or not `CommonMark` would render it as one.
#[must_use]
pub fn extract_headings(markdown: &str) -> Vec<Header> {
  let mut fences = FenceTracker::new();
  let mut headers = Vec::new();

  for line in markdown.lines() {
    if fences.observe(line) || fences.in_code_block() {
      continue;
    }
    if line.trim().starts_with('<') || line.starts_with("#@") {
      continue;
    }
    if let Some(header) = parse_atx_heading(line) {
      headers.push(header);
    }
  }

  headers
}

/// Parse a single `# Heading` line.
///
/// The level is the number of leading `#`. The text is the line without the
/// markers and the whitespace after them; a line like `#tag` keeps its text.
fn parse_atx_heading(line: &str) -> Option<Header> {
  static MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_or_never(r"^#+\s+", "MARKER_RE"));

  let level = line.chars().take_while(|&c| c == '#').count();
  if level == 0 {
    return None;
  }

  let text = MARKER_RE.replace(line, "");
  Some(Header {
    id:    slugify(&text),
    text:  text.into_owned(),
    level: u8::try_from(level).unwrap_or(u8::MAX),
  })
}

/// The text of the first level-one heading, if any.
#[must_use]
pub fn first_h1(headers: &[Header]) -> Option<String> {
  headers
    .iter()
    .find(|h| h.level == 1)
    .map(|h| h.text.clone())
}

/// Remove HTML tags from a fragment and decode entities.
///
/// Used to recover the visible text of rendered headings.
#[must_use]
pub fn strip_tags(html: &str) -> String {
  static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| compile_or_never(r"<[^>]*>", "TAG_RE"));
  let text = TAG_RE.replace_all(html, "");
  html_escape::decode_html_entities(&text).into_owned()
}

/// Compile a static pattern, falling back to a regex that never matches.
///
/// Static patterns are known good, but a broken one must degrade a single
/// transformation rather than take down the whole build.
#[must_use]
pub fn compile_or_never(pattern: &str, name: &str) -> Regex {
  Regex::new(pattern).unwrap_or_else(|e| {
    log::error!(
      "Failed to compile {name} regex: {e}\n Falling back to never matching \
       regex."
    );
    never_matching_regex()
  })
}

/// Create a regex that never matches anything.
///
/// `[^\s\S]` asserts a character that is neither whitespace nor
/// non-whitespace, so it can never match, including on empty input.
#[must_use]
#[allow(
  clippy::expect_used,
  reason = "This pattern is guaranteed to be valid"
)]
pub fn never_matching_regex() -> Regex {
  Regex::new(r"[^\s\S]").expect("regex pattern [^\\s\\S] should always compile")
}
