//! Shortcodes: `[[ComponentName key=value]]` markers on a paragraph of their
//! own, rendered as registered widgets.
//!
//! ```markdown
//! Some prose.
//!
//! [[Spirograph radius=120 label="Try me"]]
//! ```
use std::{collections::BTreeMap, fmt::Write, sync::Arc, sync::LazyLock};

use html_escape::{encode_double_quoted_attribute, encode_text};
use indexmap::IndexMap;
use regex::Regex;

use crate::utils::compile_or_never;

/// A parsed shortcode marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shortcode {
  pub name:  String,
  /// Props in the order they were written. Repeated keys keep the last value.
  pub props: IndexMap<String, String>,
}

static SHORTCODE_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never(r"^\s*\[\[([A-Za-z0-9_]+)(.*?)\]\]\s*$", "SHORTCODE_RE")
});

static PROP_RE: LazyLock<Regex> = LazyLock::new(|| {
  compile_or_never(r#"([a-zA-Z0-9_]+)=("(.*?)"|[^\s"]+)"#, "PROP_RE")
});

/// Parse the text of a paragraph as a shortcode.
///
/// The whole text must be the marker, optionally surrounded by whitespace.
#[must_use]
pub fn parse_shortcode(text: &str) -> Option<Shortcode> {
  let caps = SHORTCODE_RE.captures(text)?;
  Some(Shortcode {
    name:  caps[1].to_string(),
    props: parse_props(caps.get(2).map_or("", |m| m.as_str())),
  })
}

/// Parse `key=value` and `key="quoted value"` pairs.
#[must_use]
pub fn parse_props(raw: &str) -> IndexMap<String, String> {
  let mut props = IndexMap::new();
  for caps in PROP_RE.captures_iter(raw) {
    let key = caps[1].to_string();
    let value = caps
      .get(3)
      .or_else(|| caps.get(2))
      .map_or_else(String::new, |m| m.as_str().to_string());
    props.insert(key, value);
  }
  props
}

/// Renders a shortcode to an HTML block.
pub type WidgetFn = dyn Fn(&Shortcode, &WidgetContext) -> String + Send + Sync;

/// Site-level values widgets may need.
#[derive(Debug, Clone, Default)]
pub struct WidgetContext {
  /// URL of the spirograph WASM glue module.
  pub wasm_module: String,
}

/// Maps shortcode names to widget renderers.
#[derive(Clone)]
pub struct ShortcodeRegistry {
  widgets: BTreeMap<String, Arc<WidgetFn>>,
}

impl std::fmt::Debug for ShortcodeRegistry {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ShortcodeRegistry")
      .field("widgets", &self.widgets.keys().collect::<Vec<_>>())
      .finish()
  }
}

impl Default for ShortcodeRegistry {
  fn default() -> Self {
    Self::with_builtins()
  }
}

impl ShortcodeRegistry {
  /// A registry with no widgets at all.
  #[must_use]
  pub fn empty() -> Self {
    Self {
      widgets: BTreeMap::new(),
    }
  }

  /// A registry with the built-in `CustomComponent` and `Spirograph` widgets.
  #[must_use]
  pub fn with_builtins() -> Self {
    let mut registry = Self::empty();
    registry.register("CustomComponent", render_custom_component);
    registry.register("Spirograph", render_spirograph);
    registry
  }

  /// Register a widget, replacing any existing widget with the same name.
  pub fn register<F>(&mut self, name: impl Into<String>, widget: F)
  where
    F: Fn(&Shortcode, &WidgetContext) -> String + Send + Sync + 'static,
  {
    self.widgets.insert(name.into(), Arc::new(widget));
  }

  /// Register a widget from an HTML snippet with `{{key}}` placeholders.
  ///
  /// Placeholders are replaced with the HTML-escaped prop value, or removed
  /// when the prop is absent. `{{name}}` expands to the shortcode name.
  pub fn register_template(&mut self, name: impl Into<String>, html: String) {
    self.register(name, move |shortcode, _| {
      expand_template(&html, shortcode)
    });
  }

  #[must_use]
  pub fn contains(&self, name: &str) -> bool {
    self.widgets.contains_key(name)
  }

  /// Render a shortcode, or an inline notice if it is not registered.
  #[must_use]
  pub fn render(&self, shortcode: &Shortcode, ctx: &WidgetContext) -> String {
    self.widgets.get(&shortcode.name).map_or_else(
      || {
        log::warn!("Unknown shortcode: {}", shortcode.name);
        format!(
          "<div class=\"shortcode shortcode-unknown\">Unknown shortcode: \
           {}</div>",
          encode_text(&shortcode.name)
        )
      },
      |widget| widget(shortcode, ctx),
    )
  }
}

/// Mount point picked up by the client script, which instantiates the WASM
/// module once per page and shares it between every spirograph on it.
/// A `class` prop is merged into the widget's own class list.
fn render_custom_component(shortcode: &Shortcode, _: &WidgetContext) -> String {
  let mut class = String::from("shortcode");
  let mut props = shortcode.props.clone();
  props.retain(|key, value| {
    if key.eq_ignore_ascii_case("class") {
      class.push(' ');
      class.push_str(value);
      return false;
    }
    true
  });

  format!(
    "<div class=\"{}\"{}>Yay Custom</div>",
    encode_double_quoted_attribute(&class),
    prop_attributes(&props, "")
  )
}

fn render_spirograph(shortcode: &Shortcode, ctx: &WidgetContext) -> String {
  format!(
    "<div class=\"shortcode spirograph\" data-widget=\"spirograph\" \
     data-wasm-module=\"{}\"{}><canvas class=\"spirograph-canvas\"></canvas>\
     <noscript>This demo needs JavaScript and WebAssembly.</noscript></div>",
    encode_double_quoted_attribute(&ctx.wasm_module),
    prop_attributes(&shortcode.props, "data-")
  )
}

/// Render props as HTML attributes with an optional name prefix.
fn prop_attributes(props: &IndexMap<String, String>, prefix: &str) -> String {
  let mut attrs = String::new();
  for (key, value) in props {
    // Keys are restricted to [A-Za-z0-9_] by the prop pattern.
    let _ = write!(
      attrs,
      " {prefix}{}=\"{}\"",
      key.to_lowercase(),
      encode_double_quoted_attribute(value)
    );
  }
  attrs
}

fn expand_template(html: &str, shortcode: &Shortcode) -> String {
  static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    compile_or_never(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}", "PLACEHOLDER_RE")
  });

  PLACEHOLDER_RE
    .replace_all(html, |caps: &regex::Captures| {
      let key = &caps[1];
      if key == "name" && !shortcode.props.contains_key("name") {
        return encode_text(&shortcode.name).into_owned();
      }
      shortcode
        .props
        .get(key)
        .map(|v| encode_double_quoted_attribute(v).into_owned())
        .unwrap_or_default()
    })
    .into_owned()
}
