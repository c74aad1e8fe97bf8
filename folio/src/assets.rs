use std::{fs, path::Path};

use color_eyre::eyre::{Context, Result};
use folio_config::Config;
use folio_templates::{DEFAULT_CSS, MAIN_JS};
use log::debug;

/// Write the stylesheet and script to `assets/`, then copy the static
/// directory, if any, over the output root.
///
/// Both assets can be replaced by a file of the same name in the template
/// directory.
///
/// # Errors
///
/// Returns an error if any asset cannot be read or written.
pub fn copy_assets(config: &Config) -> Result<()> {
  let assets_dir = config.output_dir.join("assets");
  fs::create_dir_all(&assets_dir).wrap_err_with(|| {
    format!("Failed to create assets directory: {}", assets_dir.display())
  })?;

  copy_template_asset(config, &assets_dir, "style.css", DEFAULT_CSS)?;
  copy_template_asset(config, &assets_dir, "main.js", MAIN_JS)?;

  copy_static_dir(config)
}

/// Copies a template asset to the assets directory, allowing user override if
/// present.
fn copy_template_asset(
  config: &Config,
  assets_dir: &Path,
  filename: &str,
  fallback_content: &str,
) -> Result<()> {
  let content = match config.get_template_file(filename) {
    Some(path) if path.exists() => {
      debug!("Using {filename} from {}", path.display());
      fs::read_to_string(&path).wrap_err_with(|| {
        format!("Failed to read {} from: {}", filename, path.display())
      })?
    },
    _ => fallback_content.to_string(),
  };

  fs::write(assets_dir.join(filename), content)
    .wrap_err_with(|| format!("Failed to write {filename} to assets directory"))
}

/// Copies the contents of the static directory into the output root, so
/// `static/wasm/x.js` ends up at `/wasm/x.js`.
fn copy_static_dir(config: &Config) -> Result<()> {
  let Some(static_dir) = &config.static_dir else {
    return Ok(());
  };
  if !static_dir.is_dir() {
    return Ok(());
  }

  debug!("Copying static files from {}", static_dir.display());
  let options = fs_extra::dir::CopyOptions::new()
    .overwrite(true)
    .content_only(true);
  fs_extra::dir::copy(static_dir, &config.output_dir, &options)
    .wrap_err("Failed to copy static files")?;
  Ok(())
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use super::*;

  #[test]
  fn writes_assets_and_static_files() {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().join("static");
    fs::create_dir_all(static_dir.join("wasm")).unwrap();
    fs::write(static_dir.join("wasm/spirograph_wasm.js"), "export {}").unwrap();

    let template_dir = dir.path().join("templates");
    fs::create_dir_all(&template_dir).unwrap();
    fs::write(template_dir.join("style.css"), "body { color: red; }").unwrap();

    let config = Config {
      output_dir: dir.path().join("out"),
      static_dir: Some(static_dir),
      template_dir: Some(template_dir),
      ..Config::default()
    };
    copy_assets(&config).unwrap();

    let out = &config.output_dir;
    assert_eq!(
      fs::read_to_string(out.join("assets/style.css")).unwrap(),
      "body { color: red; }"
    );
    assert_eq!(
      fs::read_to_string(out.join("assets/main.js")).unwrap(),
      MAIN_JS
    );
    assert!(out.join("wasm/spirograph_wasm.js").exists());
  }
}
