//! The merged configuration exposed to the rest of the build pipeline.

use serde::Serialize;

use crate::keys;
use crate::value::{Map, Value};

static EMPTY_MAP: Map = Map::new();

/// The authoritative configuration produced by one resolution pass.
///
/// Read-only: overrides go through the resolver, which swaps in a complete
/// replacement rather than mutating an exposed instance. Every accessor
/// falls back to an empty view when a key is missing, though resolutions
/// that start from the stock defaults always carry every category key.
#[derive(Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedConfig {
    root: Map,
}

impl ResolvedConfig {
    pub(crate) const fn new(root: Map) -> Self {
        Self { root }
    }

    /// Look up a top-level key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.root.get(key)
    }

    /// The whole configuration as a mapping.
    #[must_use]
    pub const fn as_map(&self) -> &Map {
        &self.root
    }

    /// Template formats in declaration order.
    #[must_use]
    pub fn template_formats(&self) -> Vec<&str> {
        self.root
            .get(keys::TEMPLATE_FORMATS)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }

    /// The deployment path prefix, `/` when unset.
    #[must_use]
    pub fn path_prefix(&self) -> &str {
        self.root
            .get(keys::PATH_PREFIX)
            .and_then(Value::as_str)
            .unwrap_or("/")
    }

    /// The project directory layout section.
    #[must_use]
    pub fn dir(&self) -> &Map {
        self.section(keys::DIR)
    }

    /// Registered Liquid tags.
    #[must_use]
    pub fn liquid_tags(&self) -> &Map {
        self.section(keys::LIQUID_TAGS)
    }

    /// Registered Liquid filters.
    #[must_use]
    pub fn liquid_filters(&self) -> &Map {
        self.section(keys::LIQUID_FILTERS)
    }

    /// The Liquid engine options object.
    #[must_use]
    pub fn liquid_options(&self) -> &Value {
        self.root.get(keys::LIQUID_OPTIONS).unwrap_or(&Value::Null)
    }

    /// Registered synchronous Tera filters.
    #[must_use]
    pub fn tera_filters(&self) -> &Map {
        self.section(keys::TERA_FILTERS)
    }

    /// Registered asynchronous Tera filters.
    #[must_use]
    pub fn tera_async_filters(&self) -> &Map {
        self.section(keys::TERA_ASYNC_FILTERS)
    }

    /// Registered Handlebars helpers.
    #[must_use]
    pub fn handlebars_helpers(&self) -> &Map {
        self.section(keys::HANDLEBARS_HELPERS)
    }

    /// Registered output transforms.
    #[must_use]
    pub fn transforms(&self) -> &Map {
        self.section(keys::TRANSFORMS)
    }

    /// Layout aliases, from-name to to-name.
    #[must_use]
    pub fn layout_aliases(&self) -> &Map {
        self.section(keys::LAYOUT_ALIASES)
    }

    /// Pass-through copy paths and their enabled flags.
    #[must_use]
    pub fn passthrough_copies(&self) -> &Map {
        self.section(keys::PASSTHROUGH_COPIES)
    }

    /// Template engine overrides, keyed by lowercased engine name.
    #[must_use]
    pub fn library_overrides(&self) -> &Map {
        self.section(keys::LIBRARY_OVERRIDES)
    }

    /// The markdown engine options object.
    #[must_use]
    pub fn markdown_options(&self) -> &Value {
        self.root
            .get(keys::MARKDOWN_OPTIONS)
            .unwrap_or(&Value::Null)
    }

    fn section(&self, key: &str) -> &Map {
        self.root
            .get(key)
            .and_then(Value::as_map)
            .unwrap_or(&EMPTY_MAP)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn resolved(value: serde_json::Value) -> ResolvedConfig {
        let root = Value::from(value).as_map().cloned().unwrap_or_default();
        ResolvedConfig::new(root)
    }

    #[test]
    fn accessors_read_their_keys() {
        let config = resolved(json!({
            "template_formats": ["md", "html"],
            "path_prefix": "/blog/",
            "layout_aliases": {"post": "layouts/post.liquid"},
        }));
        assert_eq!(config.template_formats(), ["md", "html"]);
        assert_eq!(config.path_prefix(), "/blog/");
        assert_eq!(
            config.layout_aliases().get("post").and_then(Value::as_str),
            Some("layouts/post.liquid")
        );
    }

    #[test]
    fn missing_keys_fall_back_to_empty_views() {
        let config = resolved(json!({}));
        assert!(config.template_formats().is_empty());
        assert_eq!(config.path_prefix(), "/");
        assert!(config.liquid_filters().is_empty());
        assert_eq!(config.liquid_options(), &Value::Null);
    }
}
