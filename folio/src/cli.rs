use std::path::PathBuf;

use clap::{Parser, Subcommand};
use folio_config::Config;

/// Command line interface for folio
#[derive(Parser, Debug)]
#[command(author, version, about = "folio: a blog and portfolio generator")]
pub struct Cli {
  /// Subcommand to execute (see [`Commands`])
  #[command(subcommand)]
  pub command: Option<Commands>,

  /// Enable verbose debug logging
  #[arg(short, long, global = true)]
  pub verbose: bool,

  /// Path to configuration file(s) (TOML or JSON, can be specified multiple
  /// times). Multiple files are merged in order, with later files overriding
  /// earlier ones. A field left out of a later file takes its default there,
  /// and that default replaces the earlier value; only optional fields and
  /// `shortcodes` carry over
  #[arg(
    short = 'c',
    long = "config-file",
    global = true,
    action = clap::ArgAction::Append
  )]
  pub config_files: Vec<PathBuf>,

  /// Override configuration values (KEY=VALUE format, can be used multiple
  /// times)
  #[arg(long = "config", global = true, action = clap::ArgAction::Append)]
  pub config_overrides: Vec<String>,
}

/// All supported subcommands for the folio CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
  /// Initialize a new folio configuration file
  Init {
    /// Path to create the configuration file at
    #[arg(short, long, default_value = "folio.toml")]
    output: PathBuf,

    /// Format of the configuration file.
    #[arg(short = 'F', long, default_value = "toml", value_parser = ["toml", "json"])]
    format: String,

    /// Force overwrite if file already exists
    #[arg(short, long)]
    force: bool,
  },

  /// Export the embedded templates to a directory for customization.
  Export {
    /// Output directory for template files.
    #[arg(short, long, default_value = "templates")]
    output_dir: PathBuf,

    /// Whether to overwrite existing files.
    #[arg(long)]
    force: bool,
  },

  /// Render posts and pages into the output directory.
  Build(BuildArgs),

  /// Serve the output directory over HTTP.
  #[cfg(feature = "serve")]
  Serve {
    /// Directory to serve. Defaults to the configured output directory.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long, default_value_t = 8080)]
    port: u16,
  },
}

/// Flags of the `build` subcommand. Each one, when given, wins over the
/// configuration files and `--config` overrides.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct BuildArgs {
  /// Directory containing the Markdown posts.
  #[arg(short, long)]
  pub input_dir: Option<PathBuf>,

  /// Output directory for the generated site.
  #[arg(short, long)]
  pub output_dir: Option<PathBuf>,

  /// Site title.
  #[arg(short = 'T', long)]
  pub title: Option<String>,

  /// Number of threads to use for parallel rendering.
  #[arg(short = 'p', long = "jobs")]
  pub jobs: Option<usize>,

  /// Skip all network access.
  #[arg(long)]
  pub offline: bool,

  /// Directory with templates overriding the embedded ones.
  #[arg(long = "template-dir")]
  pub template_dir: Option<PathBuf>,
}

impl BuildArgs {
  /// Apply the flags that were given to `config`.
  pub fn apply_to(&self, config: &mut Config) {
    if let Some(input_dir) = &self.input_dir {
      config.input_dir.clone_from(input_dir);
    }
    if let Some(output_dir) = &self.output_dir {
      config.output_dir.clone_from(output_dir);
    }
    if let Some(title) = &self.title {
      config.title.clone_from(title);
    }
    if self.jobs.is_some() {
      config.jobs = self.jobs;
    }
    if self.offline {
      config.offline = true;
    }
    if self.template_dir.is_some() {
      config.template_dir.clone_from(&self.template_dir);
    }
  }
}

impl Cli {
  /// Parse command line arguments into a [`Cli`] struct.
  #[must_use]
  pub fn parse_args() -> Self {
    Self::parse()
  }
}
