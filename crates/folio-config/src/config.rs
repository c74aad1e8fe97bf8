use std::{
  collections::BTreeMap,
  fs,
  path::{Path, PathBuf},
  str::FromStr,
  sync::OnceLock,
};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File names searched, in order, when no config file is given.
pub const CONFIG_FILENAMES: [&str; 4] =
  ["folio.toml", "folio.json", ".folio.toml", ".config/folio.toml"];

/// Configuration for the folio site generator.
///
/// [`Config`] holds everything that controls a build: where posts live, where
/// the site goes, the GitHub activity feed, template overrides and extra
/// shortcodes. Fields are typically loaded from a TOML or JSON config file,
/// but can also be set via `--config KEY=VALUE` or dedicated CLI arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
  /// Directory containing Markdown posts.
  pub input_dir: PathBuf,

  /// Output directory for the generated site.
  pub output_dir: PathBuf,

  /// Site title.
  pub title: String,

  /// Line shown under the title on the home page.
  pub tagline: String,

  /// Text to be inserted in the footer.
  pub footer_text: String,

  /// GitHub user whose pull requests fill the activity feed.
  pub github_username: Option<String>,

  /// How many months back the activity feed reaches.
  pub feed_window_months: u32,

  /// Page size requested from the search API.
  pub feed_per_page: u32,

  /// Base URL of the GitHub REST API.
  pub github_api_url: String,

  /// Base URL for raw file contents.
  pub github_raw_url: String,

  /// Environment variable that may hold a GitHub token.
  pub github_token_env: String,

  /// Build without network access.
  pub offline: bool,

  /// Number of threads to use for parallel processing.
  pub jobs: Option<usize>,

  /// Directory with templates overriding the embedded ones.
  pub template_dir: Option<PathBuf>,

  /// Directory copied verbatim into the output.
  pub static_dir: Option<PathBuf>,

  /// URL of the spirograph WASM glue module.
  pub wasm_module: String,

  /// strftime-style format for post dates.
  pub date_format: String,

  /// Template shortcodes: name to HTML with `{{key}}` placeholders.
  pub shortcodes: BTreeMap<String, String>,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      input_dir:          PathBuf::from("posts"),
      output_dir:         PathBuf::from("build"),
      title:              "folio".to_string(),
      tagline:            String::new(),
      footer_text:        "Built with folio".to_string(),
      github_username:    None,
      feed_window_months: 1,
      feed_per_page:      100,
      github_api_url:     "https://api.github.com".to_string(),
      github_raw_url:     "https://raw.githubusercontent.com".to_string(),
      github_token_env:   "GITHUB_TOKEN".to_string(),
      offline:            false,
      jobs:               None,
      template_dir:       None,
      static_dir:         None,
      wasm_module:        "/wasm/spirograph_wasm.js".to_string(),
      date_format:        "%-m/%-d/%Y".to_string(),
      shortcodes:         BTreeMap::new(),
    }
  }
}

impl Config {
  /// Load configuration from a file (TOML or JSON).
  ///
  /// # Arguments
  ///
  /// * `path` - Path to the configuration file.
  ///
  /// # Errors
  ///
  /// Returns an error if the file cannot be read or parsed, or if the format is
  /// unsupported.
  pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to read config file: {}: {}",
        path.display(),
        e
      ))
    })?;

    let Some(ext) = path.extension().and_then(|ext| ext.to_str()) else {
      return Err(ConfigError::Config(format!(
        "Config file has no extension: {}",
        path.display()
      )));
    };

    match ext.to_lowercase().as_str() {
      "json" => {
        serde_json::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse JSON config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      "toml" => {
        toml::from_str(&content).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to parse TOML config from {}: {}",
            path.display(),
            e
          ))
        })
      },
      _ => {
        Err(ConfigError::Config(format!(
          "Unsupported config file format: {}",
          path.display()
        )))
      },
    }
  }

  /// Load configuration from files and overrides.
  ///
  /// Explicit config files are merged in order. Without any, a config file
  /// is searched for in the current directory, falling back to defaults.
  /// `KEY=VALUE` overrides are applied last.
  ///
  /// # Errors
  ///
  /// Returns an error if a config file cannot be loaded or an override is
  /// malformed.
  pub fn load(
    config_files: &[PathBuf],
    config_overrides: &[String],
  ) -> Result<Self, ConfigError> {
    let mut config = if let Some((first, rest)) = config_files.split_first() {
      let mut merged_config = Self::from_file(first).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load config from {}: {}",
          first.display(),
          e
        ))
      })?;

      for config_path in rest {
        let additional_config = Self::from_file(config_path).map_err(|e| {
          ConfigError::Config(format!(
            "Failed to load config from {}: {}",
            config_path.display(),
            e
          ))
        })?;
        merged_config.merge(additional_config);
      }

      if config_files.len() > 1 {
        log::info!("Loaded and merged {} config files", config_files.len());
      }

      merged_config
    } else if let Some(discovered_config) = Self::find_config_file() {
      log::info!(
        "Using discovered config file: {}",
        discovered_config.display()
      );
      Self::from_file(&discovered_config).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to load discovered config from {}: {}",
          discovered_config.display(),
          e
        ))
      })?
    } else {
      Self::default()
    };

    if !config_overrides.is_empty() {
      config.apply_overrides(config_overrides)?;
    }

    // Path validation is deferred until CLI arguments have been merged.
    Ok(config)
  }

  /// Apply configuration overrides from KEY=VALUE strings.
  ///
  /// # Errors
  ///
  /// Returns an error if:
  ///
  /// - An override string is not in KEY=VALUE format
  /// - A key is not recognized
  /// - A value cannot be parsed as the expected type
  ///
  /// # Example
  ///
  /// ```rust
  /// # use folio_config::Config;
  /// let mut config = Config::default();
  /// config
  ///   .apply_overrides(&[
  ///     "offline=yes".to_string(),
  ///     "title=My Blog".to_string(),
  ///   ])
  ///   .unwrap();
  /// assert!(config.offline);
  /// ```
  pub fn apply_overrides(
    &mut self,
    overrides: &[String],
  ) -> Result<(), ConfigError> {
    for override_str in overrides {
      let (key, value) = override_str.split_once('=').ok_or_else(|| {
        ConfigError::Config(format!(
          "Invalid config override format: '{override_str}'. Expected \
           KEY=VALUE"
        ))
      })?;

      self.apply_override(key.trim(), value.trim())?;
    }

    Ok(())
  }

  /// Set a single field by key.
  ///
  /// Booleans accept `true/false/yes/no/1/0`. An empty value clears an
  /// optional field. `shortcodes.NAME` sets one shortcode template; an empty
  /// value removes it.
  ///
  /// # Errors
  ///
  /// Returns an error for unknown keys or values that do not parse.
  pub fn apply_override(
    &mut self,
    key: &str,
    value: &str,
  ) -> Result<(), ConfigError> {
    if let Some(name) = key.strip_prefix("shortcodes.") {
      if value.is_empty() {
        self.shortcodes.remove(name);
      } else {
        self.shortcodes.insert(name.to_string(), value.to_string());
      }
      return Ok(());
    }

    match key {
      "input_dir" => self.input_dir = PathBuf::from(value),
      "output_dir" => self.output_dir = PathBuf::from(value),
      "title" => self.title = value.to_string(),
      "tagline" => self.tagline = value.to_string(),
      "footer_text" => self.footer_text = value.to_string(),
      "github_username" => self.github_username = optional(value),
      "feed_window_months" => {
        self.feed_window_months = parse_value(key, value)?;
      },
      "feed_per_page" => self.feed_per_page = parse_value(key, value)?,
      "github_api_url" => self.github_api_url = value.to_string(),
      "github_raw_url" => self.github_raw_url = value.to_string(),
      "github_token_env" => self.github_token_env = value.to_string(),
      "offline" => self.offline = parse_bool(key, value)?,
      "jobs" => {
        self.jobs = if value.is_empty() {
          None
        } else {
          Some(parse_value(key, value)?)
        };
      },
      "template_dir" => self.template_dir = optional(value).map(PathBuf::from),
      "static_dir" => self.static_dir = optional(value).map(PathBuf::from),
      "wasm_module" => self.wasm_module = value.to_string(),
      "date_format" => self.date_format = value.to_string(),
      _ => {
        return Err(ConfigError::Config(format!(
          "Unknown configuration key: '{key}'"
        )));
      },
    }

    Ok(())
  }

  /// Merge another config into this one, with the other config's values taking
  /// precedence.
  ///
  /// # Merge Rules
  ///
  /// - [`Option<T>`] fields: Other's [`Some`] value replaces this config's
  ///   value
  /// - Plain fields (String, bool, etc.): Other's value always replaces, even
  ///   when `other` only holds the default because its file left it out
  /// - `shortcodes`: Other's entries are merged in (can override individual
  ///   keys)
  pub fn merge(&mut self, other: Self) {
    self.input_dir = other.input_dir;
    self.output_dir = other.output_dir;
    self.title = other.title;
    self.tagline = other.tagline;
    self.footer_text = other.footer_text;
    if other.github_username.is_some() {
      self.github_username = other.github_username;
    }
    self.feed_window_months = other.feed_window_months;
    self.feed_per_page = other.feed_per_page;
    self.github_api_url = other.github_api_url;
    self.github_raw_url = other.github_raw_url;
    self.github_token_env = other.github_token_env;
    self.offline = other.offline;
    if other.jobs.is_some() {
      self.jobs = other.jobs;
    }
    if other.template_dir.is_some() {
      self.template_dir = other.template_dir;
    }
    if other.static_dir.is_some() {
      self.static_dir = other.static_dir;
    }
    self.wasm_module = other.wasm_module;
    self.date_format = other.date_format;
    self.shortcodes.extend(other.shortcodes);
  }

  /// Token from the environment variable named by `github_token_env`.
  #[must_use]
  pub fn github_token(&self) -> Option<String> {
    std::env::var(&self.github_token_env)
      .ok()
      .filter(|token| !token.trim().is_empty())
  }

  /// Path to a template override, if a template directory is configured.
  ///
  /// This method does not check if the returned path exists.
  #[must_use]
  pub fn get_template_file(&self, name: &str) -> Option<PathBuf> {
    self.template_dir.as_ref().map(|dir| dir.join(name))
  }

  /// Search for config files in common locations
  #[must_use]
  pub fn find_config_file() -> Option<PathBuf> {
    static RESULT: OnceLock<Option<PathBuf>> = OnceLock::new();
    RESULT
      .get_or_init(|| {
        let current_dir = std::env::current_dir().ok()?;
        Self::find_config_file_in(&current_dir)
      })
      .clone()
  }

  /// Search `dir` for the first of [`CONFIG_FILENAMES`] that exists.
  #[must_use]
  pub fn find_config_file_in(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILENAMES
      .iter()
      .map(|filename| dir.join(filename))
      .find(|path| path.is_file())
  }

  /// Validate all paths specified in the configuration
  ///
  /// # Errors
  ///
  /// Returns an error if any configured path does not exist or is invalid.
  pub fn validate_paths(&self) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if !self.input_dir.exists() {
      errors.push(format!(
        "Input directory does not exist: {}",
        self.input_dir.display()
      ));
    } else if !self.input_dir.is_dir() {
      errors.push(format!(
        "Input path is not a directory: {}",
        self.input_dir.display()
      ));
    }

    for (label, dir) in [
      ("Template directory", &self.template_dir),
      ("Static directory", &self.static_dir),
    ] {
      let Some(dir) = dir else { continue };
      if !dir.exists() {
        errors.push(format!("{label} does not exist: {}", dir.display()));
      } else if !dir.is_dir() {
        errors
          .push(format!("{label} path is not a directory: {}", dir.display()));
      }
    }

    if !errors.is_empty() {
      let error_message = errors.join("\n");
      return Err(ConfigError::Config(format!(
        "Configuration path validation errors:\n{error_message}"
      )));
    }

    Ok(())
  }

  /// Generate a default configuration file with commented explanations
  ///
  /// # Errors
  ///
  /// Returns an error if the format is unsupported or the file cannot be
  /// written.
  pub fn generate_default_config(
    format: &str,
    path: &Path,
  ) -> Result<(), ConfigError> {
    let config_content = crate::templates::get_template(format)
      .map_err(|e| ConfigError::Template(e.to_string()))?;

    fs::write(path, config_content).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to write default config to {}: {}",
        path.display(),
        e
      ))
    })?;

    log::info!("Created default configuration file: {}", path.display());
    Ok(())
  }

  /// Export embedded templates to a directory for customization
  ///
  /// Existing files are kept unless `force` is set.
  ///
  /// # Errors
  ///
  /// Returns an error if the output directory cannot be created or a template
  /// cannot be written.
  pub fn export_templates(
    output_dir: &Path,
    force: bool,
  ) -> Result<(), ConfigError> {
    fs::create_dir_all(output_dir).map_err(|e| {
      ConfigError::Config(format!(
        "Failed to create template directory: {}: {}",
        output_dir.display(),
        e
      ))
    })?;

    for (filename, content) in folio_templates::all_templates() {
      let file_path = output_dir.join(filename);

      if file_path.exists() && !force {
        log::warn!(
          "File {} already exists. Use --force to overwrite.",
          file_path.display()
        );
        continue;
      }

      fs::write(&file_path, content).map_err(|e| {
        ConfigError::Config(format!(
          "Failed to write template file: {}: {}",
          file_path.display(),
          e
        ))
      })?;
      log::info!("Exported template: {}", file_path.display());
    }

    Ok(())
  }
}

fn optional(value: &str) -> Option<String> {
  (!value.is_empty()).then(|| value.to_string())
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
  match value.to_lowercase().as_str() {
    "true" | "yes" | "1" => Ok(true),
    "false" | "no" | "0" => Ok(false),
    _ => {
      Err(ConfigError::Config(format!(
        "Invalid boolean value '{value}' for '{key}'. Expected one of: \
         true, false, yes, no, 1, 0"
      )))
    },
  }
}

fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigError>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  value.parse().map_err(|e| {
    ConfigError::Config(format!("Invalid value '{value}' for '{key}': {e}"))
  })
}
