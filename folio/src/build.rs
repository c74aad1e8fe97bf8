//! The `build` pipeline: posts, the home feed, the fixed pages and assets.
use std::{
  collections::HashSet,
  fs,
  path::{Path, PathBuf},
  sync::Arc,
};

use color_eyre::eyre::{Context, Result};
use folio_commonmark::{
  MarkdownOptions,
  MarkdownProcessor,
  OfflineFetcher,
  SnippetFetcher,
  processor::{
    MarkdownOptionsBuilder,
    collect_markdown_files,
    process_with_recovery,
  },
};
use folio_config::Config;
use folio_github::{GithubClient, GithubSettings, feed_since};
use folio_html::{
  Feed,
  PostSummary,
  paths::{
    HOME_PAGE,
    NOT_FOUND_PAGE,
    POSTS_INDEX_PAGE,
    WASM_PAGE,
    post_page_path,
  },
  render_home,
  render_not_found,
  render_post,
  render_posts_index,
  render_wasm_page,
  sort_newest_first,
};
use log::{debug, info, warn};
use rayon::prelude::*;

use crate::assets::copy_assets;

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSummary {
  /// Posts written, newest first.
  pub posts:   Vec<PostSummary>,
  /// Markdown files that were not written (unreadable or duplicate slugs).
  pub skipped: usize,
  pub feed:    Feed,
}

/// Build the whole site described by `config`.
///
/// Content problems end up inline in the pages. Only configuration errors
/// and failures to write the output abort the build.
///
/// # Errors
///
/// Returns an error if the configured paths are invalid or an output file
/// cannot be written.
pub fn build_site(config: &Config) -> Result<BuildSummary> {
  info!("Starting site build...");
  config
    .validate_paths()
    .wrap_err("Invalid configuration paths")?;

  fs::create_dir_all(&config.output_dir).wrap_err_with(|| {
    format!(
      "Failed to create output directory: {}",
      config.output_dir.display()
    )
  })?;
  info!("Output directory: {}", config.output_dir.display());

  let options = markdown_options(config);
  let client = github_client(config)?;

  let fetcher: Arc<dyn SnippetFetcher> = match &client {
    Some(client) => Arc::clone(client) as Arc<dyn SnippetFetcher>,
    None => Arc::new(OfflineFetcher),
  };
  let processor = MarkdownProcessor::new(options.clone()).with_fetcher(fetcher);

  let thread_count = config.jobs.unwrap_or_else(num_cpus::get).max(1);
  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(thread_count)
    .build()
    .wrap_err("Failed to create thread pool")?;
  debug!("Rendering with {thread_count} threads");

  let (files, skipped) = unique_posts(collect_markdown_files(&config.input_dir));

  let (rendered, feed) = pool.install(|| {
    rayon::join(
      || render_posts(config, &processor, &files),
      || load_feed(config, client.as_deref(), &options),
    )
  });
  let mut posts = rendered?;
  let skipped = skipped + files.len() - posts.len();
  sort_newest_first(&mut posts);
  info!("Rendered {} posts", posts.len());

  write_page(
    &config.output_dir,
    Path::new(HOME_PAGE),
    &render_home(config, &posts, &feed)?,
  )?;
  write_page(
    &config.output_dir,
    Path::new(POSTS_INDEX_PAGE),
    &render_posts_index(config)?,
  )?;
  write_page(
    &config.output_dir,
    Path::new(WASM_PAGE),
    &render_wasm_page(config)?,
  )?;
  write_page(
    &config.output_dir,
    Path::new(NOT_FOUND_PAGE),
    &render_not_found(config)?,
  )?;

  copy_assets(config)?;

  info!("Site written to {}", config.output_dir.display());
  Ok(BuildSummary {
    posts,
    skipped,
    feed,
  })
}

/// Markdown options carried by the configuration.
#[must_use]
pub fn markdown_options(config: &Config) -> MarkdownOptions {
  MarkdownOptionsBuilder::new()
    .wasm_module(config.wasm_module.clone())
    .shortcodes(config.shortcodes.clone())
    .build()
}

/// Connection settings for the configured GitHub endpoints.
#[must_use]
pub fn github_settings(config: &Config) -> GithubSettings {
  GithubSettings {
    api_url: config.github_api_url.clone(),
    raw_url: config.github_raw_url.clone(),
    token: config.github_token(),
    ..GithubSettings::default()
  }
}

fn github_client(config: &Config) -> Result<Option<Arc<GithubClient>>> {
  if config.offline {
    info!("Offline build: GitHub content is skipped");
    return Ok(None);
  }
  let client = GithubClient::new(github_settings(config))
    .wrap_err("Failed to create GitHub client")?;
  Ok(Some(Arc::new(client)))
}

/// Slug of a post: its file stem.
#[must_use]
pub fn post_slug(path: &Path) -> Option<&str> {
  path.file_stem().and_then(|stem| stem.to_str())
}

/// Drop files whose slug is taken by an earlier file, returning the kept
/// files and the number dropped.
fn unique_posts(files: Vec<PathBuf>) -> (Vec<(String, PathBuf)>, usize) {
  let mut seen = HashSet::new();
  let mut kept = Vec::with_capacity(files.len());
  let mut skipped = 0;

  for path in files {
    let Some(slug) = post_slug(&path) else {
      warn!("Skipping post with a non UTF-8 name: {}", path.display());
      skipped += 1;
      continue;
    };
    if seen.insert(slug.to_string()) {
      kept.push((slug.to_string(), path));
    } else {
      warn!(
        "Skipping {}: slug '{slug}' is already used by another post",
        path.display()
      );
      skipped += 1;
    }
  }

  (kept, skipped)
}

fn render_posts(
  config: &Config,
  processor: &MarkdownProcessor,
  files: &[(String, PathBuf)],
) -> Result<Vec<PostSummary>> {
  files
    .par_iter()
    .filter_map(|(slug, path)| {
      let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
          warn!("Skipping {}: {e}", path.display());
          return None;
        },
      };
      debug!("Rendering {}", path.display());
      Some(render_one(config, processor, slug, &content))
    })
    .collect()
}

fn render_one(
  config: &Config,
  processor: &MarkdownProcessor,
  slug: &str,
  content: &str,
) -> Result<PostSummary> {
  let result = process_with_recovery(processor, content);
  let html = render_post(config, slug, &result)
    .wrap_err_with(|| format!("Failed to render post '{slug}'"))?;
  write_page(&config.output_dir, &post_page_path(slug), &html)?;
  Ok(PostSummary::from_result(slug, &result))
}

/// Fetch the pull request feed once for this build.
fn load_feed(
  config: &Config,
  client: Option<&GithubClient>,
  options: &MarkdownOptions,
) -> Feed {
  let (Some(client), Some(username)) = (client, &config.github_username)
  else {
    return Feed::Disabled;
  };

  let today = jiff::Zoned::now().date();
  let search = feed_since(today, config.feed_window_months).and_then(|since| {
    client.search_recent_pull_requests(username, since, config.feed_per_page)
  });
  if let Ok(items) = &search {
    info!("Loaded {} pull requests for {username}", items.len());
  }
  Feed::from_search(search, options)
}

fn write_page(output_dir: &Path, rel_path: &Path, html: &str) -> Result<()> {
  let path = output_dir.join(rel_path);
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).wrap_err_with(|| {
      format!("Failed to create directory: {}", parent.display())
    })?;
  }
  fs::write(&path, html)
    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
  debug!("Wrote {}", path.display());
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duplicate_slugs_keep_first() {
    let (kept, skipped) = unique_posts(vec![
      PathBuf::from("posts/2024/hello.md"),
      PathBuf::from("posts/hello.md"),
      PathBuf::from("posts/world.md"),
    ]);
    assert_eq!(skipped, 1);
    assert_eq!(kept.len(), 2);
    assert_eq!(kept[0].0, "hello");
    assert_eq!(kept[0].1, PathBuf::from("posts/2024/hello.md"));
  }

  #[test]
  fn options_follow_config() {
    let mut config = Config {
      wasm_module: "/static/spiro.js".to_string(),
      ..Config::default()
    };
    config
      .shortcodes
      .insert("Note".to_string(), "<aside>{{text}}</aside>".to_string());

    let options = markdown_options(&config);
    assert_eq!(options.wasm_module, "/static/spiro.js");
    assert!(options.shortcodes.contains_key("Note"));
  }

  #[test]
  fn offline_feed_is_disabled() {
    let config = Config {
      github_username: Some("octocat".to_string()),
      ..Config::default()
    };
    assert_eq!(
      load_feed(&config, None, &MarkdownOptions::default()),
      Feed::Disabled
    );
  }
}
