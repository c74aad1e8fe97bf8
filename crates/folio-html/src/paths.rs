use std::{
  collections::HashMap,
  path::{Path, PathBuf},
};

pub const HOME_PAGE: &str = "index.html";
pub const POSTS_INDEX_PAGE: &str = "posts/index.html";
pub const WASM_PAGE: &str = "rust_wasm/index.html";
pub const NOT_FOUND_PAGE: &str = "404.html";

/// Output path of a post, relative to the output directory.
#[must_use]
pub fn post_page_path(slug: &str) -> PathBuf {
  Path::new("posts").join(slug).join("index.html")
}

/// Calculate the relative path prefix needed to reach the site root from a
/// given file path.
///
/// `index.html` needs no prefix, `posts/index.html` needs `../` and
/// `posts/hello/index.html` needs `../../`.
#[must_use]
pub fn calculate_root_relative_path(file_rel_path: &Path) -> String {
  let depth = file_rel_path.components().count();
  if depth <= 1 {
    String::new()
  } else {
    "../".repeat(depth - 1)
  }
}

/// Asset and navigation paths for a page whose root prefix is `root_prefix`.
#[must_use]
pub fn generate_asset_paths(root_prefix: &str) -> HashMap<&'static str, String> {
  let mut paths = HashMap::new();
  paths.insert("stylesheet_path", format!("{root_prefix}assets/style.css"));
  paths.insert("main_js_path", format!("{root_prefix}assets/main.js"));
  paths.insert("index_path", format!("{root_prefix}index.html"));
  paths.insert("wasm_page_path", format!("{root_prefix}rust_wasm/"));
  paths
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn root_prefix_follows_depth() {
    assert_eq!(calculate_root_relative_path(Path::new(HOME_PAGE)), "");
    assert_eq!(
      calculate_root_relative_path(Path::new(POSTS_INDEX_PAGE)),
      "../"
    );
    assert_eq!(
      calculate_root_relative_path(&post_page_path("hello")),
      "../../"
    );
  }

  #[test]
  fn asset_paths_use_prefix() {
    let paths = generate_asset_paths("../../");
    assert_eq!(paths["stylesheet_path"], "../../assets/style.css");
    assert_eq!(paths["main_js_path"], "../../assets/main.js");
  }
}
