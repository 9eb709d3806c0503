//! Project configuration sources.
//!
//! A source produces the project configuration layer for the resolver. The
//! trait keeps the resolver independent of how project configuration
//! reaches it: [`FileSource`] reads it from disk, [`FnSource`] evaluates a
//! host-embedded closure against the registration store, and
//! [`StaticSource`] serves fixed data for tests.

use std::fmt;

use camino::Utf8Path;

use crate::error::ConfigResult;
use crate::user_config::UserConfig;
use crate::value::Value;

mod file;

pub use file::{CANDIDATE_FILE_NAMES, FileSource};

/// Produces the project configuration mapping.
pub trait ConfigSource {
    /// Produce the project configuration for `path`, registering through
    /// `api` as a side effect where applicable.
    ///
    /// `Ok(None)` means no project configuration exists at `path`; that is
    /// never an error.
    ///
    /// # Errors
    ///
    /// Implementations return [`crate::ConfigError::Source`] for load
    /// failures the resolver may absorb, and propagate registration errors
    /// raised by project configuration code untouched.
    fn load(&self, path: &Utf8Path, api: &mut UserConfig) -> ConfigResult<Option<Value>>;
}

/// Adapts a closure over the registration store into a configuration
/// source.
///
/// This is the "project configuration as a function of the API object"
/// form: the closure registers filters, collections, and events through
/// `api`, then returns the configuration mapping. It is also the natural
/// test double when a test needs to observe or count load calls.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use strata_config::{ConfigResolver, FnSource, Value};
///
/// # fn main() -> strata_config::ConfigResult<()> {
/// let resolver = ConfigResolver::builder()
///     .source(FnSource::new(|api| {
///         api.set_template_formats("md");
///         Ok(Value::from(json!({"dir": {"output": "public"}})))
///     }))
///     .build()?;
/// assert_eq!(resolver.config().template_formats(), ["md"]);
/// # Ok(())
/// # }
/// ```
pub struct FnSource<F> {
    produce: F,
}

impl<F> FnSource<F>
where
    F: Fn(&mut UserConfig) -> ConfigResult<Value>,
{
    /// Wrap `produce` as a configuration source.
    #[must_use]
    pub const fn new(produce: F) -> Self {
        Self { produce }
    }
}

impl<F> ConfigSource for FnSource<F>
where
    F: Fn(&mut UserConfig) -> ConfigResult<Value>,
{
    fn load(&self, _path: &Utf8Path, api: &mut UserConfig) -> ConfigResult<Option<Value>> {
        (self.produce)(api).map(Some)
    }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource")
            .field("produce", &"<closure>")
            .finish()
    }
}

/// A source serving a fixed mapping, or nothing at all.
#[derive(Clone, Debug)]
pub struct StaticSource {
    value: Option<Value>,
}

impl StaticSource {
    /// A source that always yields `value`.
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }

    /// A source behaving like a missing project configuration.
    #[must_use]
    pub const fn absent() -> Self {
        Self { value: None }
    }
}

impl ConfigSource for StaticSource {
    fn load(&self, _path: &Utf8Path, _api: &mut UserConfig) -> ConfigResult<Option<Value>> {
        Ok(self.value.clone())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn fn_sources_register_through_the_store() {
        let source = FnSource::new(|api: &mut UserConfig| {
            api.set_template_formats("md");
            Ok(Value::from(json!({"a": 1})))
        });
        let mut api = UserConfig::new();
        let loaded = source.load(Utf8Path::new(".strata.toml"), &mut api);

        assert_eq!(loaded.ok().flatten(), Some(Value::from(json!({"a": 1}))));
        assert!(api.template_formats().is_some());
    }

    #[test]
    fn absent_static_sources_yield_nothing() {
        let mut api = UserConfig::new();
        let loaded = StaticSource::absent().load(Utf8Path::new("anywhere.toml"), &mut api);
        assert_eq!(loaded.ok().flatten(), None);
    }
}
