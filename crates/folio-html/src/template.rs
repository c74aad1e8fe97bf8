use std::{
  borrow::Cow,
  collections::HashMap,
  fmt::Write,
  fs,
  path::Path,
  sync::{LazyLock, PoisonError, RwLock},
};

use color_eyre::eyre::{Context, Result};
use folio_commonmark::{CoverImage, Header, MarkdownResult};
use folio_config::Config;
use folio_templates as templates;
use html_escape::{encode_double_quoted_attribute, encode_text};
use jiff::civil::Date;
use log::warn;
use serde::Serialize;
use tera::Tera;

use crate::{
  feed::{Feed, PrCard},
  paths::{
    HOME_PAGE,
    POSTS_INDEX_PAGE,
    WASM_PAGE,
    calculate_root_relative_path,
    generate_asset_paths,
    post_page_path,
  },
  wasm::PRESETS,
};

const BASE_TEMPLATE: &str = templates::BASE_TEMPLATE;
const HOME_TEMPLATE: &str = templates::HOME_TEMPLATE;
const POST_TEMPLATE: &str = templates::POST_TEMPLATE;
const POSTS_TEMPLATE: &str = templates::POSTS_TEMPLATE;
const NOT_FOUND_TEMPLATE: &str = templates::NOT_FOUND_TEMPLATE;
const RUST_WASM_TEMPLATE: &str = templates::RUST_WASM_TEMPLATE;

/// The 404 page is served for arbitrary paths, so it links from the root.
const NOT_FOUND_ROOT: &str = "/";

static TEMPLATE_CACHE: LazyLock<RwLock<HashMap<String, String>>> =
  LazyLock::new(|| RwLock::new(HashMap::new()));

/// A post as listed on the home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostSummary {
  pub slug:         String,
  pub title:        String,
  pub subtitle:     Option<String>,
  pub published_on: Option<Date>,
}

impl PostSummary {
  /// Summarise a rendered post. Posts without a title use their slug.
  #[must_use]
  pub fn from_result(slug: &str, result: &MarkdownResult) -> Self {
    Self {
      slug:         slug.to_string(),
      title:        post_title(slug, result).to_string(),
      subtitle:     result.front_matter.subtitle.clone(),
      published_on: result.front_matter.published_on,
    }
  }
}

/// Newest first; undated posts go last, ties are ordered by slug.
pub fn sort_newest_first(posts: &mut [PostSummary]) {
  posts.sort_by(|a, b| {
    b.published_on
      .cmp(&a.published_on)
      .then_with(|| a.slug.cmp(&b.slug))
  });
}

/// Format `date` with a strftime-style `format`.
///
/// An unusable format is logged and the ISO date is returned instead.
#[must_use]
pub fn format_date(date: Date, format: &str) -> String {
  jiff::fmt::strtime::format(format, date).unwrap_or_else(|e| {
    warn!("Invalid date format {format:?}: {e}");
    date.to_string()
  })
}

#[derive(Debug, Serialize)]
struct Breadcrumb {
  label: String,
  href:  Option<String>,
}

#[derive(Debug, Serialize)]
struct PostItemView {
  slug:     String,
  title:    String,
  subtitle: Option<String>,
  date:     Option<String>,
  date_iso: Option<String>,
}

#[derive(Debug, Serialize)]
struct PrCardView {
  project:   String,
  number:    u64,
  title:     String,
  html_url:  String,
  body_html: Option<String>,
}

impl From<&PrCard> for PrCardView {
  fn from(card: &PrCard) -> Self {
    Self {
      project:   encode_text(&card.project).into_owned(),
      number:    card.number,
      title:     encode_text(&card.title).into_owned(),
      html_url:  attr(&card.html_url),
      body_html: card.body_html.clone(),
    }
  }
}

#[derive(Debug, Serialize)]
struct CoverView {
  src:    String,
  alt:    String,
  source: Option<String>,
}

impl From<&CoverImage> for CoverView {
  fn from(cover: &CoverImage) -> Self {
    Self {
      src:    attr(&cover.src),
      alt:    attr(&cover.alt),
      source: cover.source.as_deref().map(attr),
    }
  }
}

/// Shared chrome around every page.
struct Layout<'a> {
  page:        &'a str,
  title:       String,
  root_prefix: &'a str,
  breadcrumbs: Vec<Breadcrumb>,
}

/// Render a single post page.
///
/// # Errors
///
/// Returns an error if a template cannot be read, parsed or rendered.
pub fn render_post(
  config: &Config,
  slug: &str,
  result: &MarkdownResult,
) -> Result<String> {
  let root_prefix = calculate_root_relative_path(&post_page_path(slug));
  let front_matter = &result.front_matter;
  let title = post_title(slug, result);

  let mut ctx = tera::Context::new();
  ctx.insert("root_prefix", &root_prefix);
  ctx.insert("title", &encode_text(title));
  ctx.insert(
    "subtitle",
    &front_matter.subtitle.as_deref().map(encode_text),
  );
  ctx.insert(
    "date",
    &front_matter
      .published_on
      .map(|date| encode_text(&format_date(date, &config.date_format)).into_owned()),
  );
  ctx.insert(
    "date_iso",
    &front_matter.published_on.map(|date| date.to_string()),
  );
  ctx.insert(
    "cover_image",
    &front_matter.cover_image.as_ref().map(CoverView::from),
  );
  ctx.insert("toc", &generate_toc(&result.headers));
  ctx.insert("content", &result.html);

  let content = render_template(config, "post.html", POST_TEMPLATE, &ctx)?;
  render_layout(
    config,
    &Layout {
      page: "post",
      title: format!("{title} | {}", config.title),
      root_prefix: &root_prefix,
      breadcrumbs: Vec::new(),
    },
    &content,
  )
}

/// Render the home page: header, pull request feed and post list.
///
/// `posts` are listed in the order given.
///
/// # Errors
///
/// Returns an error if a template cannot be read, parsed or rendered.
pub fn render_home(
  config: &Config,
  posts: &[PostSummary],
  feed: &Feed,
) -> Result<String> {
  let root_prefix = calculate_root_relative_path(Path::new(HOME_PAGE));

  let post_items: Vec<PostItemView> = posts
    .iter()
    .map(|post| {
      PostItemView {
        slug:     attr(&post.slug),
        title:    encode_text(&post.title).into_owned(),
        subtitle: post
          .subtitle
          .as_deref()
          .map(|s| encode_text(s).into_owned()),
        date:     post.published_on.map(|date| {
          encode_text(&format_date(date, &config.date_format)).into_owned()
        }),
        date_iso: post.published_on.map(|date| date.to_string()),
      }
    })
    .collect();

  let (cards, feed_error): (Vec<PrCardView>, Option<Cow<'_, str>>) =
    match feed {
      Feed::Loaded(cards) => (cards.iter().map(PrCardView::from).collect(), None),
      Feed::Failed(message) => (Vec::new(), Some(encode_text(message))),
      Feed::Disabled => (Vec::new(), None),
    };

  let mut ctx = tera::Context::new();
  ctx.insert("root_prefix", &root_prefix);
  ctx.insert("site_title", &encode_text(&config.title));
  ctx.insert("tagline", &encode_text(&config.tagline));
  ctx.insert("feed_enabled", &feed.is_enabled());
  ctx.insert("feed_error", &feed_error);
  ctx.insert("pull_requests", &cards);
  ctx.insert("posts", &post_items);

  let content = render_template(config, "home.html", HOME_TEMPLATE, &ctx)?;
  render_layout(
    config,
    &Layout {
      page: "home",
      title: config.title.clone(),
      root_prefix: &root_prefix,
      breadcrumbs: Vec::new(),
    },
    &content,
  )
}

/// Render `/posts/`, which only points back home.
///
/// # Errors
///
/// Returns an error if a template cannot be read, parsed or rendered.
pub fn render_posts_index(config: &Config) -> Result<String> {
  let root_prefix = calculate_root_relative_path(Path::new(POSTS_INDEX_PAGE));

  let mut ctx = tera::Context::new();
  ctx.insert("root_prefix", &root_prefix);

  let content = render_template(config, "posts.html", POSTS_TEMPLATE, &ctx)?;
  render_layout(
    config,
    &Layout {
      page: "posts",
      title: format!("Posts | {}", config.title),
      root_prefix: &root_prefix,
      breadcrumbs: Vec::new(),
    },
    &content,
  )
}

/// Render the page served for unknown paths.
///
/// # Errors
///
/// Returns an error if a template cannot be read, parsed or rendered.
pub fn render_not_found(config: &Config) -> Result<String> {
  let mut ctx = tera::Context::new();
  ctx.insert("root_prefix", NOT_FOUND_ROOT);

  let content =
    render_template(config, "404.html", NOT_FOUND_TEMPLATE, &ctx)?;
  render_layout(
    config,
    &Layout {
      page: "not-found",
      title: format!("Post not found | {}", config.title),
      root_prefix: NOT_FOUND_ROOT,
      breadcrumbs: Vec::new(),
    },
    &content,
  )
}

/// Render the spirograph playground.
///
/// # Errors
///
/// Returns an error if a template cannot be read, parsed or rendered.
pub fn render_wasm_page(config: &Config) -> Result<String> {
  let root_prefix = calculate_root_relative_path(Path::new(WASM_PAGE));

  let mut ctx = tera::Context::new();
  ctx.insert("root_prefix", &root_prefix);
  ctx.insert("wasm_module", &attr(&config.wasm_module));
  ctx.insert("presets", PRESETS);

  let content =
    render_template(config, "rust_wasm.html", RUST_WASM_TEMPLATE, &ctx)?;
  render_layout(
    config,
    &Layout {
      page: "rust-wasm",
      title: format!("Spirographs | {}", config.title),
      root_prefix: &root_prefix,
      breadcrumbs: vec![
        Breadcrumb {
          label: encode_text(&config.title).into_owned(),
          href:  Some(root_prefix.clone()),
        },
        Breadcrumb {
          label: "Rust + WASM".to_string(),
          href:  None,
        },
      ],
    },
    &content,
  )
}

fn render_layout(
  config: &Config,
  layout: &Layout<'_>,
  content: &str,
) -> Result<String> {
  let asset_paths = generate_asset_paths(layout.root_prefix);

  let mut ctx = tera::Context::new();
  ctx.insert("page", layout.page);
  ctx.insert("title", &encode_text(&layout.title));
  ctx.insert("root_prefix", layout.root_prefix);
  ctx.insert("breadcrumbs", &layout.breadcrumbs);
  ctx.insert("footer_text", &encode_text(&config.footer_text));
  ctx.insert("content", content);
  for (key, path) in &asset_paths {
    ctx.insert(*key, path);
  }

  render_template(config, "base.html", BASE_TEMPLATE, &ctx)
}

/// Parse and render one template.
///
/// Templates are registered without their `.html` extension, which keeps
/// Tera's autoescaping off: every value is escaped before insertion and
/// HTML fragments go in as they are.
fn render_template(
  config: &Config,
  file_name: &str,
  fallback: &str,
  ctx: &tera::Context,
) -> Result<String> {
  let content = get_template_content(config, file_name, fallback)?;
  let name = file_name.trim_end_matches(".html");

  let mut tera = Tera::default();
  tera
    .add_raw_template(name, &content)
    .wrap_err_with(|| format!("Failed to parse template {file_name}"))?;
  tera
    .render(name, ctx)
    .wrap_err_with(|| format!("Failed to render template {file_name}"))
}

fn get_template_content(
  config: &Config,
  template_name: &str,
  fallback: &str,
) -> Result<String> {
  // The key includes the template directory so different configs don't
  // share entries.
  let template_dir_key = config
    .template_dir
    .as_ref()
    .map_or_else(|| "default".to_string(), |p| p.display().to_string());
  let cache_key = format!("{template_dir_key}:{template_name}");

  {
    let cache = TEMPLATE_CACHE.read().unwrap_or_else(PoisonError::into_inner);
    if let Some(cached) = cache.get(&cache_key) {
      return Ok(cached.clone());
    }
  }

  let content = load_template_content(config, template_name, fallback)?;

  {
    let mut cache =
      TEMPLATE_CACHE.write().unwrap_or_else(PoisonError::into_inner);
    cache.entry(cache_key).or_insert_with(|| content.clone());
  }

  Ok(content)
}

/// Read `template_name` from the template directory, or use the embedded
/// default.
fn load_template_content(
  config: &Config,
  template_name: &str,
  fallback: &str,
) -> Result<String> {
  if let Some(template_path) = config.get_template_file(template_name)
    && template_path.exists()
  {
    return fs::read_to_string(&template_path).wrap_err_with(|| {
      format!("Failed to read template file: {}", template_path.display())
    });
  }
  Ok(fallback.to_string())
}

/// Build the "On this page" list. Level 2 entries are the main items, level
/// 3 entries are indented and everything else is light.
fn generate_toc(headers: &[Header]) -> String {
  if headers.is_empty() {
    return String::new();
  }

  let mut toc = String::from("<ul>\n");
  for header in headers {
    let class = match header.level {
      2 => "toc-level-2",
      3 => "toc-level-3",
      _ => "toc-level-other",
    };
    // Writing to String is infallible
    let _ = writeln!(
      toc,
      "<li class=\"{class}\"><a href=\"#{}\">{}</a></li>",
      encode_double_quoted_attribute(&header.id),
      encode_text(&header.text)
    );
  }
  toc.push_str("</ul>");
  toc
}

fn post_title<'a>(slug: &'a str, result: &'a MarkdownResult) -> &'a str {
  result.title.as_deref().unwrap_or(slug)
}

fn attr(value: &str) -> String {
  encode_double_quoted_attribute(value).into_owned()
}

#[cfg(test)]
mod tests {
  #![allow(clippy::unwrap_used, reason = "Fine in tests")]
  use folio_commonmark::FrontMatter;
  use jiff::civil::date;

  use super::*;

  fn header(text: &str, level: u8, id: &str) -> Header {
    Header {
      text: text.to_string(),
      level,
      id: id.to_string(),
    }
  }

  #[test]
  fn toc_classes_follow_level() {
    let toc = generate_toc(&[
      header("Intro", 1, "intro"),
      header("Setup", 2, "setup"),
      header("Details & more", 3, "details--more"),
    ]);
    assert!(toc.contains("<li class=\"toc-level-other\"><a href=\"#intro\">Intro</a></li>"));
    assert!(toc.contains("<li class=\"toc-level-2\"><a href=\"#setup\">Setup</a></li>"));
    assert!(toc.contains("<li class=\"toc-level-3\"><a href=\"#details--more\">Details &amp; more</a></li>"));
  }

  #[test]
  fn no_headers_no_toc() {
    assert_eq!(generate_toc(&[]), "");
  }

  #[test]
  fn date_formats() {
    assert_eq!(format_date(date(2025, 3, 7), "%-m/%-d/%Y"), "3/7/2025");
    assert_eq!(format_date(date(2025, 3, 7), "%B %-d, %Y"), "March 7, 2025");
  }

  #[test]
  fn newest_posts_first_undated_last() {
    let post = |slug: &str, published_on| {
      PostSummary {
        slug: slug.to_string(),
        title: slug.to_string(),
        subtitle: None,
        published_on,
      }
    };
    let mut posts = vec![
      post("undated", None),
      post("old", Some(date(2024, 1, 1))),
      post("new", Some(date(2025, 6, 1))),
    ];
    sort_newest_first(&mut posts);
    let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
    assert_eq!(slugs, ["new", "old", "undated"]);
  }

  #[test]
  fn summary_falls_back_to_slug() {
    let result = MarkdownResult {
      html:         String::new(),
      headers:      Vec::new(),
      title:        None,
      front_matter: FrontMatter::default(),
    };
    assert_eq!(PostSummary::from_result("my-post", &result).title, "my-post");
  }
}
