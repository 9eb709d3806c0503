//! Canonical key names shared by the default configuration, the registration
//! snapshot, and the resolved configuration.

/// Liquid custom tag factories.
pub const LIQUID_TAGS: &str = "liquid_tags";
/// Liquid filters.
pub const LIQUID_FILTERS: &str = "liquid_filters";
/// The single Liquid engine options object.
pub const LIQUID_OPTIONS: &str = "liquid_options";
/// Tera filters (synchronous).
pub const TERA_FILTERS: &str = "tera_filters";
/// Tera filters (asynchronous).
pub const TERA_ASYNC_FILTERS: &str = "tera_async_filters";
/// Handlebars helpers.
pub const HANDLEBARS_HELPERS: &str = "handlebars_helpers";
/// Output transforms. The key predates the universal-filter API and kept its
/// original spelling for compatibility.
pub const TRANSFORMS: &str = "filters";
/// Layout alias map (from-name to to-name).
pub const LAYOUT_ALIASES: &str = "layout_aliases";
/// Pass-through copy paths (path to enabled flag).
pub const PASSTHROUGH_COPIES: &str = "passthrough_copies";
/// Template engine instance overrides, keyed by lowercased engine name.
pub const LIBRARY_OVERRIDES: &str = "library_overrides";
/// The single markdown engine options object.
pub const MARKDOWN_OPTIONS: &str = "markdown_options";
/// Ordered template format sequence.
pub const TEMPLATE_FORMATS: &str = "template_formats";
/// Deployment path prefix.
pub const PATH_PREFIX: &str = "path_prefix";
/// Project directory layout section.
pub const DIR: &str = "dir";

/// Every registration category carried by the default configuration and the
/// registration snapshot, in snapshot order.
pub const CATEGORIES: [&str; 11] = [
    LIQUID_TAGS,
    LIQUID_FILTERS,
    LIQUID_OPTIONS,
    TERA_FILTERS,
    TERA_ASYNC_FILTERS,
    HANDLEBARS_HELPERS,
    TRANSFORMS,
    LAYOUT_ALIASES,
    PASSTHROUGH_COPIES,
    LIBRARY_OVERRIDES,
    MARKDOWN_OPTIONS,
];
