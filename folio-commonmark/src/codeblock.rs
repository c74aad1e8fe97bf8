//! Fenced code blocks with multiple snippets, file properties and snippets
//! pulled from GitHub.
//!
//! A fence may carry several files separated by a `---` line surrounded by
//! blank lines. Languages are given in order, separated by `|`:
//!
//! ````markdown
//! ```rust|toml
//! #@title=src/main.rs
//!
//! fn main() {}
//!
//! ---
//!
//! #@title=Cargo.toml
//! [package]
//! ```
//! ````
//!
//! A fence tagged `github` holds JSON naming files to fetch from a commit:
//!
//! ````markdown
//! ```github
//! {"repo": "owner/name", "commit": "abc123",
//!  "files": [{"file": "src/lib.rs", "entryFile": true, "foldRanges": [[1, 4]]}]}
//! ```
//! ````
use std::{collections::BTreeMap, fmt::Write, sync::LazyLock};

use html_escape::{encode_double_quoted_attribute, encode_text};
use indexmap::IndexMap;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::utils::compile_or_never;

/// Separator between snippets in a multi-file fence.
pub const SNIPPET_SEPARATOR: &str = "\n\n---\n\n";

/// Commit used when a GitHub block does not name one.
pub const DEFAULT_COMMIT: &str = "main";

/// One file shown in a code display.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CodeSnippet {
  pub name:        String,
  pub language:    String,
  pub code:        String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title:       Option<String>,
  #[serde(default)]
  pub entry:       bool,
  /// Inclusive, 1-based line ranges to show collapsed.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub fold_ranges: Vec<(u32, u32)>,
}

static PROPERTY_RE: LazyLock<Regex> =
  LazyLock::new(|| compile_or_never(r"^#@(\w+)=(.*)$", "PROPERTY_RE"));

/// Split leading `#@key=value` lines off a snippet.
///
/// One blank line after the properties is dropped too. Properties with an
/// empty value are ignored.
#[must_use]
pub fn parse_properties(chunk: &str) -> (IndexMap<String, String>, &str) {
  let mut props = IndexMap::new();
  let mut rest = chunk;

  while let Some(caps) = first_line(rest).and_then(|l| PROPERTY_RE.captures(l))
  {
    let key = caps[1].trim();
    let value = caps[2].trim();
    if !value.is_empty() {
      props.insert(key.to_string(), value.to_string());
    }
    rest = rest.split_once('\n').map_or("", |(_, tail)| tail);
  }

  if rest.len() != chunk.len() {
    rest = rest
      .strip_prefix("\r\n")
      .or_else(|| rest.strip_prefix('\n'))
      .unwrap_or(rest);
  }

  (props, rest)
}

fn first_line(text: &str) -> Option<&str> {
  if text.is_empty() {
    return None;
  }
  Some(text.split('\n').next().unwrap_or(text).trim_end_matches('\r'))
}

/// Split a fence body into snippets.
///
/// `languages` is the fence info word, e.g. `rust|toml`. Snippets beyond the
/// listed languages fall back to `plaintext`.
#[must_use]
pub fn parse_code_block(languages: &str, body: &str) -> Vec<CodeSnippet> {
  let languages: Vec<&str> = languages.split('|').collect();

  body
    .trim()
    .split(SNIPPET_SEPARATOR)
    .enumerate()
    .map(|(i, chunk)| {
      let (mut props, code) = parse_properties(chunk);
      let title = props.shift_remove("title");
      CodeSnippet {
        name: title.clone().unwrap_or_else(|| format!("File {}", i + 1)),
        language: languages
          .get(i)
          .filter(|l| !l.is_empty())
          .map_or_else(|| "plaintext".to_string(), |l| (*l).to_string()),
        code: code.to_string(),
        title,
        entry: props.get("entry").is_some_and(|v| is_truthy(v)),
        fold_ranges: Vec::new(),
      }
    })
    .collect()
}

fn is_truthy(value: &str) -> bool {
  matches!(value.to_ascii_lowercase().as_str(), "true" | "yes" | "1")
}

/// JSON body of a `github` fence.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct GithubBlock {
  /// `owner/name`
  pub repo:   String,
  #[serde(default)]
  pub commit: Option<String>,
  pub files:  Vec<GithubFile>,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GithubFile {
  pub file:        String,
  #[serde(default)]
  pub entry_file:  bool,
  #[serde(default)]
  pub fold_ranges: Vec<(u32, u32)>,
}

/// Error returned by a [`SnippetFetcher`].
pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Source of remote file contents for `github` fences.
pub trait SnippetFetcher: Send + Sync {
  /// Fetch one file at a commit.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be retrieved. The message ends up
  /// in the rendered snippet.
  fn fetch(
    &self,
    owner: &str,
    repo: &str,
    commit: &str,
    path: &str,
  ) -> Result<String, FetchError>;
}

/// Fetcher used for offline builds. Every file is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineFetcher;

impl SnippetFetcher for OfflineFetcher {
  fn fetch(
    &self,
    owner: &str,
    repo: &str,
    commit: &str,
    path: &str,
  ) -> Result<String, FetchError> {
    Err(
      format!("{owner}/{repo}@{commit}:{path} is not available offline").into(),
    )
  }
}

/// Resolve a `github` fence body into snippets, fetching files in parallel.
///
/// Never fails: a malformed block yields a single `Error` snippet and a file
/// that cannot be fetched yields a snippet holding the error message.
#[must_use]
pub fn resolve_github_block(
  body: &str,
  fetcher: &dyn SnippetFetcher,
) -> Vec<CodeSnippet> {
  let block = match parse_github_block(body) {
    Ok(block) => block,
    Err(e) => {
      log::warn!("Failed to parse GitHub code block: {e}");
      return vec![CodeSnippet {
        name: "Error".to_string(),
        language: "plaintext".to_string(),
        code: format!("// Error parsing GitHub code block: {e}"),
        title: Some("Error".to_string()),
        ..CodeSnippet::default()
      }];
    },
  };

  let Some((owner, repo)) = block.repo.split_once('/') else {
    return Vec::new();
  };
  let commit = block.commit.as_deref().unwrap_or(DEFAULT_COMMIT);
  let title = block
    .commit
    .as_ref()
    .map(|commit| format!("{commit} | {}", block.repo));

  block
    .files
    .par_iter()
    .map(|file| {
      let language = extension_language(&file.file);
      match fetcher.fetch(owner, repo, commit, &file.file) {
        Ok(code) => {
          CodeSnippet {
            name: file.file.clone(),
            language,
            code,
            title: title.clone(),
            entry: file.entry_file,
            fold_ranges: file.fold_ranges.clone(),
          }
        },
        Err(e) => {
          log::warn!("Failed to fetch {}: {e}", file.file);
          CodeSnippet {
            name: file.file.clone(),
            language,
            code: format!("// Error loading file: {e}"),
            title: title.clone(),
            ..CodeSnippet::default()
          }
        },
      }
    })
    .collect()
}

fn parse_github_block(body: &str) -> Result<GithubBlock, String> {
  let block: GithubBlock =
    serde_json::from_str(body).map_err(|e| e.to_string())?;
  if !block.repo.contains('/') {
    return Err(format!("repo '{}' is not in owner/name form", block.repo));
  }
  Ok(block)
}

/// Language tag for a path: its extension, or `plaintext`.
fn extension_language(path: &str) -> String {
  path
    .rsplit_once('.')
    .map(|(_, ext)| ext)
    .filter(|ext| !ext.is_empty() && !ext.contains('/'))
    .unwrap_or("plaintext")
    .to_string()
}

/// HTML for a set of snippets.
///
/// The markup is inert without `main.js`, which wires up tab switching,
/// file tree selection and the expand toggle.
#[derive(Debug, Clone, Copy)]
pub struct CodeDisplay<'a> {
  snippets: &'a [CodeSnippet],
}

impl<'a> CodeDisplay<'a> {
  #[must_use]
  pub const fn new(snippets: &'a [CodeSnippet]) -> Self {
    Self { snippets }
  }

  /// Tabs carry file names only when every snippet has a title.
  #[must_use]
  pub fn show_labels(&self) -> bool {
    self.snippets.iter().all(|s| s.title.is_some())
  }

  #[must_use]
  pub fn show_file_tree(&self) -> bool {
    self.show_labels()
      && self.snippets.len() > 1
      && self.snippets.iter().any(|s| s.name.contains('/'))
  }

  /// Index of the initially selected snippet.
  #[must_use]
  pub fn entry_index(&self) -> usize {
    self.snippets.iter().position(|s| s.entry).unwrap_or(0)
  }

  #[must_use]
  pub fn render(&self) -> String {
    match self.snippets {
      [] => "<div class=\"code-display code-loading\">Loading...</div>\n"
        .to_string(),
      [single] => render_single(single),
      _ => self.render_tabbed(),
    }
  }

  fn render_tabbed(&self) -> String {
    let active = self.entry_index();
    let labelled = self.show_labels();
    let mut html = String::from("<div class=\"code-display code-tabbed\">");

    html.push_str("<div class=\"code-layout\">");
    if self.show_file_tree() {
      html.push_str(&self.render_file_tree(active));
    }

    html.push_str(
      "<div class=\"code-viewer\"><div class=\"code-tabs\" role=\"tablist\">",
    );
    for (i, snippet) in self.snippets.iter().enumerate() {
      let label = if labelled {
        encode_text(&snippet.name).into_owned()
      } else {
        (i + 1).to_string()
      };
      let _ = write!(
        html,
        "<button type=\"button\" class=\"code-tab{}\" role=\"tab\" \
         data-target=\"{i}\" aria-selected=\"{}\" title=\"{}\">{label}</button>",
        if i == active { " active" } else { "" },
        i == active,
        encode_double_quoted_attribute(&snippet.name),
      );
    }
    html.push_str("</div>");

    for (i, snippet) in self.snippets.iter().enumerate() {
      html.push_str(&render_panel(snippet, i, i == active));
    }
    html.push_str("</div></div>");
    html.push_str(EXPAND_BUTTON);
    html.push_str("</div>\n");
    html
  }

  fn render_file_tree(&self, active: usize) -> String {
    let mut root = TreeDir::default();
    for (i, snippet) in self.snippets.iter().enumerate() {
      let mut dir = &mut root;
      let mut parts: Vec<&str> =
        snippet.name.split('/').filter(|p| !p.is_empty()).collect();
      let Some(file) = parts.pop() else { continue };
      for part in parts {
        dir = dir.dirs.entry(part.to_string()).or_default();
      }
      dir.files.push((file.to_string(), i));
    }

    let mut html = String::from("<nav class=\"code-tree\">");
    root.render(&mut html, active);
    html.push_str("</nav>");
    html
  }
}

fn render_single(snippet: &CodeSnippet) -> String {
  let mut html = String::from("<div class=\"code-display code-single\">");
  if let Some(title) = &snippet.title {
    let _ = write!(
      html,
      "<div class=\"code-tabs\"><span class=\"code-tab \
       active\">{}</span></div>",
      encode_text(title)
    );
  }
  html.push_str(&render_panel(snippet, 0, true));
  html.push_str(EXPAND_BUTTON);
  html.push_str("</div>\n");
  html
}

const EXPAND_BUTTON: &str = "<button type=\"button\" class=\"code-expand\" \
                             title=\"Expand\" aria-label=\"Expand\"></button>";

fn render_panel(snippet: &CodeSnippet, index: usize, active: bool) -> String {
  let code = snippet.code.strip_suffix('\n').unwrap_or(&snippet.code);
  let mut html = format!(
    "<div class=\"code-panel{}\" role=\"tabpanel\" data-index=\"{index}\"{}>",
    if active { " active" } else { "" },
    if active { "" } else { " hidden" },
  );
  let _ = write!(
    html,
    "<pre><code class=\"language-{}\"",
    encode_double_quoted_attribute(&snippet.language)
  );
  if !snippet.fold_ranges.is_empty() {
    let ranges: Vec<String> = snippet
      .fold_ranges
      .iter()
      .map(|(start, end)| format!("{start}-{end}"))
      .collect();
    let _ = write!(html, " data-fold-ranges=\"{}\"", ranges.join(","));
  }
  let _ = write!(html, ">{}</code></pre></div>", encode_text(code));
  html
}

#[derive(Debug, Default)]
struct TreeDir {
  dirs:  BTreeMap<String, TreeDir>,
  files: Vec<(String, usize)>,
}

impl TreeDir {
  fn render(&self, html: &mut String, active: usize) {
    html.push_str("<ul>");
    for (name, dir) in &self.dirs {
      let _ = write!(
        html,
        "<li><details open><summary>{}</summary>",
        encode_text(name)
      );
      dir.render(html, active);
      html.push_str("</details></li>");
    }
    for (name, index) in &self.files {
      let _ = write!(
        html,
        "<li><button type=\"button\" class=\"code-tree-file{}\" \
         data-target=\"{index}\">{}</button></li>",
        if *index == active { " active" } else { "" },
        encode_text(name)
      );
    }
    html.push_str("</ul>");
  }
}
