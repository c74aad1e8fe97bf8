use std::collections::HashMap;

pub const BASE_TEMPLATE: &str = include_str!("../templates/base.html");
pub const HOME_TEMPLATE: &str = include_str!("../templates/home.html");
pub const POST_TEMPLATE: &str = include_str!("../templates/post.html");
pub const POSTS_TEMPLATE: &str = include_str!("../templates/posts.html");
pub const NOT_FOUND_TEMPLATE: &str = include_str!("../templates/404.html");
pub const RUST_WASM_TEMPLATE: &str =
  include_str!("../templates/rust_wasm.html");

pub const DEFAULT_CSS: &str = include_str!("../templates/style.css");
pub const MAIN_JS: &str = include_str!("../templates/main.js");

#[must_use]
pub fn all_templates() -> HashMap<&'static str, &'static str> {
  let mut templates = HashMap::new();
  templates.insert("base.html", BASE_TEMPLATE);
  templates.insert("home.html", HOME_TEMPLATE);
  templates.insert("post.html", POST_TEMPLATE);
  templates.insert("posts.html", POSTS_TEMPLATE);
  templates.insert("404.html", NOT_FOUND_TEMPLATE);
  templates.insert("rust_wasm.html", RUST_WASM_TEMPLATE);
  templates.insert("style.css", DEFAULT_CSS);
  templates.insert("main.js", MAIN_JS);
  templates
}
