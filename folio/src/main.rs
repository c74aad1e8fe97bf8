use std::fs;

use color_eyre::eyre::{Context, Result, bail};
use folio::{
  build::build_site,
  cli::{Cli, Commands},
};
use folio_config::Config;
use log::{LevelFilter, info};

fn main() -> Result<()> {
  color_eyre::install()?;

  // Parse command line arguments
  let cli = Cli::parse_args();

  // Initialize logging first so we can log during command handling
  env_logger::Builder::new()
    .filter_level(if cli.verbose {
      LevelFilter::Debug
    } else {
      LevelFilter::Info
    })
    .write_style(env_logger::WriteStyle::Always)
    .init();

  match &cli.command {
    Some(Commands::Init {
      output,
      format,
      force,
    }) => {
      // Check if file already exists and that we're not forcing overwrite
      if output.exists() && !force {
        bail!(
          "Configuration file already exists: {}. Use --force to overwrite.",
          output.display()
        );
      }

      if let Some(parent) = output.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
      {
        fs::create_dir_all(parent).wrap_err_with(|| {
          format!("Failed to create directory: {}", parent.display())
        })?;
        info!("Created directory: {}", parent.display());
      }

      Config::generate_default_config(format, output).wrap_err_with(|| {
        format!(
          "Failed to generate configuration file: {}",
          output.display()
        )
      })?;

      info!(
        "Configuration file created successfully. Edit it to customize your \
         site."
      );
      Ok(())
    },

    Some(Commands::Export { output_dir, force }) => {
      Config::export_templates(output_dir, *force).wrap_err_with(|| {
        format!("Failed to export templates to {}", output_dir.display())
      })
    },

    #[cfg(feature = "serve")]
    Some(Commands::Serve { output_dir, port }) => {
      let config = load_config(&cli)?;
      let dir = output_dir.as_ref().unwrap_or(&config.output_dir);
      folio::serve::serve(dir, *port)
    },

    Some(Commands::Build(args)) => {
      let mut config = load_config(&cli)?;
      args.apply_to(&mut config);
      run_build(&config)
    },

    None => run_build(&load_config(&cli)?),
  }
}

fn load_config(cli: &Cli) -> Result<Config> {
  Config::load(&cli.config_files, &cli.config_overrides)
    .wrap_err("Failed to load configuration")
}

fn run_build(config: &Config) -> Result<()> {
  let summary = build_site(config)?;
  if summary.skipped > 0 {
    info!("{} markdown files were skipped", summary.skipped);
  }
  info!("Done: {} posts", summary.posts.len());
  Ok(())
}
