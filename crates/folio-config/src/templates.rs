use std::fmt;

/// Error type for template operations.
#[derive(Debug)]
pub enum TemplateError {
  /// Indicates that the requested configuration format is not supported.
  /// Contains the name of the unsupported format.
  UnsupportedFormat(String),
}

impl fmt::Display for TemplateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::UnsupportedFormat(format) => {
        write!(f, "Unsupported config format: {format}")
      },
    }
  }
}

impl std::error::Error for TemplateError {}

/// Default configuration template in TOML, commented so that a fresh
/// `folio init` explains every field.
pub const DEFAULT_TOML_TEMPLATE: &str = r#"# folio configuration file

# Directory containing the Markdown posts
input_dir = "posts"

# Output directory for the generated site
output_dir = "build"

# Site title, shown on the home page header
title = "Hana's Portfolio"

# Line shown under the title
tagline = "Software, spirographs and other things I am working on"

# Footer text for every page
footer_text = "Built with folio"

# GitHub user whose public pull requests make up the activity feed.
# Leave unset to hide the feed.
# github_username = "octocat"

# How far back the activity feed looks, in months
feed_window_months = 1

# Maximum number of pull requests requested from the search API (1-100)
feed_per_page = 100

# API bases. Point these at a mirror or a mock server if needed.
github_api_url = "https://api.github.com"
github_raw_url = "https://raw.githubusercontent.com"

# Environment variable holding a GitHub token, used if set
github_token_env = "GITHUB_TOKEN"

# Skip all network access: no activity feed, GitHub code blocks show an error
offline = false

# Number of threads to use for rendering (defaults to number of CPU cores)
# jobs = 4

# Directory with templates overriding the embedded ones, by file name
# template_dir = "templates"

# Directory copied verbatim into the output (images, WASM glue code)
# static_dir = "static"

# URL of the spirograph WASM glue module
wasm_module = "/wasm/spirograph_wasm.js"

# strftime-style format for post dates
date_format = "%-m/%-d/%Y"

# Extra shortcodes. Each value is an HTML snippet; {{key}} is replaced with
# the escaped prop value and {{name}} with the shortcode name.
[shortcodes]
# Callout = "<aside class=\"callout {{kind}}\">{{text}}</aside>"
"#;

/// Default configuration template in JSON format.
pub const DEFAULT_JSON_TEMPLATE: &str = r#"{
  "input_dir": "posts",
  "output_dir": "build",
  "title": "Hana's Portfolio",
  "tagline": "Software, spirographs and other things I am working on",
  "footer_text": "Built with folio",
  "feed_window_months": 1,
  "feed_per_page": 100,
  "github_api_url": "https://api.github.com",
  "github_raw_url": "https://raw.githubusercontent.com",
  "github_token_env": "GITHUB_TOKEN",
  "offline": false,
  "wasm_module": "/wasm/spirograph_wasm.js",
  "date_format": "%-m/%-d/%Y",
  "shortcodes": {
    "Callout": "<aside class=\"callout {{kind}}\">{{text}}</aside>"
  }
}
"#;

/// Get the correct configuration template based on the requested format.
///
/// # Errors
///
/// Returns an error if the requested format is not supported.
pub fn get_template(format: &str) -> Result<&'static str, TemplateError> {
  match format.to_lowercase().as_str() {
    "toml" => Ok(DEFAULT_TOML_TEMPLATE),
    "json" => Ok(DEFAULT_JSON_TEMPLATE),
    _ => Err(TemplateError::UnsupportedFormat(format.to_string())),
  }
}
