//! The compiled-in default configuration.
//!
//! Every resolution starts from this layer. It is produced fresh per call
//! and never mutated in place by the resolver.

use serde_json::json;

use crate::keys;
use crate::value::{Map, Value};

/// Build the default configuration mapping.
///
/// Contains the stock template formats, the deployment path prefix, engine
/// selection defaults, the project directory layout, and an empty mapping
/// for every registration category so merged configurations always expose
/// each category key.
#[must_use]
pub fn default_config() -> Map {
    let mut root = Map::new();
    root.insert(
        keys::TEMPLATE_FORMATS.to_owned(),
        Value::from(vec!["liquid", "md", "tera", "hbs", "html"]),
    );
    root.insert(keys::PATH_PREFIX.to_owned(), Value::from("/"));
    root.insert("markdown_template_engine".to_owned(), Value::from("liquid"));
    root.insert("html_template_engine".to_owned(), Value::from("liquid"));
    root.insert("data_template_engine".to_owned(), Value::from("liquid"));
    root.insert(
        keys::DIR.to_owned(),
        Value::from(json!({
            "input": ".",
            "includes": "_includes",
            "data": "_data",
            "output": "_site",
        })),
    );
    for category in keys::CATEGORIES {
        root.insert(category.to_owned(), Value::Map(Map::new()));
    }
    root
}
