//! Page rendering for folio sites.
//!
//! Every route is a Tera template from `folio-templates`, optionally
//! overridden by a file of the same name in the configured template
//! directory, wrapped in the shared `base.html` layout.
pub mod feed;
pub mod paths;
pub mod template;
pub mod wasm;

pub use crate::{
  feed::{Feed, PrCard},
  template::{
    PostSummary,
    format_date,
    render_home,
    render_not_found,
    render_post,
    render_posts_index,
    render_wasm_page,
    sort_newest_first,
  },
};
