//! Configuration resolution for the Strata static-site builder.
//!
//! Strata merges four layers into one authoritative configuration: the
//! compiled-in defaults, the project configuration file, registrations made
//! through the [`UserConfig`] API while that file is evaluated, and runtime
//! overrides such as the deployment path prefix. This crate owns that
//! layering: [`UserConfig`] is the registration store handed to project
//! code and plugins, and [`ConfigResolver`] loads the project layer through
//! a pluggable [`ConfigSource`] and computes the merged result.
//!
//! Precedence is fixed: defaults, then the project mapping, then the
//! registration snapshot, then overrides. Mappings combine recursively;
//! arrays and scalars replace wholesale, and the keys named by
//! [`merge::MergePolicy`] (`template_formats`) replace even when both sides
//! are mappings. See [`merge`] for the mechanics.
//!
//! # Examples
//!
//! ```rust
//! use serde_json::json;
//! use strata_config::{ConfigResolver, FnSource, Value};
//!
//! # fn main() -> strata_config::ConfigResult<()> {
//! let mut resolver = ConfigResolver::builder()
//!     .source(FnSource::new(|api| {
//!         api.set_template_formats("md, html");
//!         api.add_filter("shout", |args| {
//!             Ok(args.first().cloned().unwrap_or_default())
//!         });
//!         Ok(Value::from(json!({"dir": {"output": "public"}})))
//!     }))
//!     .build()?;
//!
//! let config = resolver.config();
//! assert_eq!(config.template_formats(), ["md", "html"]);
//! assert!(config.liquid_filters().contains_key("shout"));
//!
//! resolver.set_path_prefix("/blog/");
//! assert_eq!(resolver.config().path_prefix(), "/blog/");
//! # Ok(())
//! # }
//! ```

pub mod defaults;
mod error;
mod events;
mod formats;
mod handler;
pub mod keys;
pub mod merge;
mod resolved;
mod resolver;
mod source;
mod user_config;
mod value;

pub use error::{ConfigError, ConfigResult};
pub use events::{EventBus, ListenerResult};
pub use formats::TemplateFormats;
pub use handler::{Handler, HandlerFn};
pub use resolved::ResolvedConfig;
pub use resolver::{ConfigResolver, ConfigResolverBuilder, DEFAULT_PROJECT_CONFIG_PATH};
pub use source::{CANDIDATE_FILE_NAMES, ConfigSource, FileSource, FnSource, StaticSource};
pub use user_config::{FilterKind, Plugin, UserConfig};
pub use value::{Map, Value};
