//! Computes the merged configuration from defaults, the project source, the
//! registration store, and runtime overrides.
//!
//! A resolver owns one [`UserConfig`] and one [`ConfigSource`]. Building it
//! runs the first load-and-merge pass: the source produces the project
//! mapping (registering through the store along the way), the store
//! snapshot merges over that mapping, the result merges over the defaults,
//! and overrides land last. Later override calls re-run only the merge; the
//! cached project layer is reused and the source is not consulted again
//! until the project path changes.
//!
//! Each merge swaps in a complete [`ResolvedConfig`] behind a fresh
//! [`Arc`], so consumers holding the previous snapshot never observe a
//! partially merged view.

use std::fmt;
use std::sync::Arc;

use camino::{Utf8Path, Utf8PathBuf};

use crate::defaults;
use crate::error::{ConfigError, ConfigResult};
use crate::keys;
use crate::merge::{self, MergePolicy};
use crate::resolved::ResolvedConfig;
use crate::source::{ConfigSource, FileSource};
use crate::user_config::UserConfig;
use crate::value::{Map, Value};

/// Project configuration path used when the builder does not name one.
pub const DEFAULT_PROJECT_CONFIG_PATH: &str = ".strata.toml";

/// Builder for [`ConfigResolver`].
pub struct ConfigResolverBuilder {
    source: Option<Box<dyn ConfigSource>>,
    project_config_path: Utf8PathBuf,
    defaults: Option<Value>,
    user_config: UserConfig,
}

impl Default for ConfigResolverBuilder {
    fn default() -> Self {
        Self {
            source: None,
            project_config_path: Utf8PathBuf::from(DEFAULT_PROJECT_CONFIG_PATH),
            defaults: None,
            user_config: UserConfig::new(),
        }
    }
}

impl ConfigResolverBuilder {
    /// Use `source` to load the project configuration layer. Defaults to
    /// [`FileSource`].
    #[must_use]
    pub fn source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Path handed to the source, [`DEFAULT_PROJECT_CONFIG_PATH`] unless
    /// set.
    #[must_use]
    pub fn project_config_path(mut self, path: impl Into<Utf8PathBuf>) -> Self {
        self.project_config_path = path.into();
        self
    }

    /// Replace the compiled-in default configuration, mainly for tests.
    #[must_use]
    pub fn defaults(mut self, defaults: impl Into<Value>) -> Self {
        self.defaults = Some(defaults.into());
        self
    }

    /// Seed the resolver with an existing registration store.
    #[must_use]
    pub fn user_config(mut self, user_config: UserConfig) -> Self {
        self.user_config = user_config;
        self
    }

    /// Build the resolver and run the initial resolution.
    ///
    /// # Errors
    ///
    /// Propagates fatal registration errors raised by project configuration
    /// code during the first load, and returns
    /// [`ConfigError::Validation`] when a custom default configuration is
    /// not a mapping. Source failures are logged and absorbed; they never
    /// fail the build.
    pub fn build(self) -> ConfigResult<ConfigResolver> {
        let default_layer = match self.defaults {
            None => defaults::default_config(),
            Some(Value::Map(custom)) => {
                tracing::debug!("using custom default configuration");
                custom
            }
            Some(_) => {
                return Err(ConfigError::Validation {
                    key: String::from("defaults"),
                    message: String::from("the default configuration must be a mapping"),
                });
            }
        };

        let mut resolver = ConfigResolver {
            source: self.source.unwrap_or_else(|| Box::new(FileSource)),
            project_config_path: self.project_config_path,
            defaults: default_layer,
            overrides: Map::new(),
            user_config: self.user_config,
            project: Map::new(),
            policy: MergePolicy::default(),
            config: Arc::new(ResolvedConfig::new(Map::new())),
        };
        resolver.reload()?;
        Ok(resolver)
    }
}

impl fmt::Debug for ConfigResolverBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolverBuilder")
            .field("project_config_path", &self.project_config_path)
            .field("defaults", &self.defaults)
            .field("source", &"<source>")
            .finish_non_exhaustive()
    }
}

/// Resolves the layered configuration and exposes the merged result.
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use strata_config::{ConfigResolver, StaticSource, Value};
///
/// # fn main() -> strata_config::ConfigResult<()> {
/// let mut resolver = ConfigResolver::builder()
///     .source(StaticSource::new(Value::from(json!({
///         "dir": {"output": "public"},
///     }))))
///     .build()?;
///
/// let output = resolver
///     .config()
///     .dir()
///     .get("output")
///     .and_then(Value::as_str)
///     .map(str::to_owned);
/// assert_eq!(output.as_deref(), Some("public"));
///
/// resolver.set_path_prefix("/blog/");
/// assert_eq!(resolver.config().path_prefix(), "/blog/");
/// # Ok(())
/// # }
/// ```
pub struct ConfigResolver {
    source: Box<dyn ConfigSource>,
    project_config_path: Utf8PathBuf,
    defaults: Map,
    overrides: Map,
    user_config: UserConfig,
    project: Map,
    policy: MergePolicy,
    config: Arc<ResolvedConfig>,
}

impl ConfigResolver {
    /// Start building a resolver.
    #[must_use]
    pub fn builder() -> ConfigResolverBuilder {
        ConfigResolverBuilder::default()
    }

    /// The current merged configuration.
    ///
    /// The same `Arc` is returned until the next merge replaces it.
    #[must_use]
    pub const fn config(&self) -> &Arc<ResolvedConfig> {
        &self.config
    }

    /// The path the project configuration is loaded from.
    #[must_use]
    pub fn project_config_path(&self) -> &Utf8Path {
        &self.project_config_path
    }

    /// The registration store owned by this resolver.
    #[must_use]
    pub const fn user_config(&self) -> &UserConfig {
        &self.user_config
    }

    /// Mutable access to the registration store.
    ///
    /// Registrations made here are picked up by the next merge; call
    /// [`ConfigResolver::set_project_config_path`] or
    /// [`ConfigResolver::set_path_prefix`] to trigger one.
    pub const fn user_config_mut(&mut self) -> &mut UserConfig {
        &mut self.user_config
    }

    /// Point the resolver at a different project configuration path and
    /// re-run load and merge.
    ///
    /// The registration store is read again but never cleared, so
    /// registrations accumulated earlier remain in force.
    ///
    /// # Errors
    ///
    /// Propagates fatal registration errors raised by project configuration
    /// code; source failures are logged and absorbed. On error the exposed
    /// configuration keeps its previous value.
    pub fn set_project_config_path(&mut self, path: impl Into<Utf8PathBuf>) -> ConfigResult<()> {
        self.project_config_path = path.into();
        self.reload()
    }

    /// Force the deployment path prefix and re-run the merge.
    ///
    /// Only the merge is re-run; the cached project layer is reused and the
    /// source is not consulted.
    pub fn set_path_prefix(&mut self, prefix: impl Into<String>) {
        let forced = prefix.into();
        tracing::debug!(path_prefix = %forced, "setting path prefix");
        self.overrides
            .insert(keys::PATH_PREFIX.to_owned(), Value::String(forced));
        self.remerge();
    }

    fn reload(&mut self) -> ConfigResult<()> {
        let loaded = match self
            .source
            .load(&self.project_config_path, &mut self.user_config)
        {
            Ok(Some(value)) => value,
            Ok(None) => {
                tracing::debug!(
                    path = %self.project_config_path,
                    "no project configuration found, skipping"
                );
                Value::Map(Map::new())
            }
            Err(error) if error.is_recoverable() => {
                tracing::error!(
                    path = %self.project_config_path,
                    error = %error,
                    "failed to load project configuration, continuing without it"
                );
                Value::Map(Map::new())
            }
            Err(error) => return Err(error),
        };
        self.project = coerce_project_map(loaded);
        self.remerge();
        Ok(())
    }

    fn remerge(&mut self) {
        let mut local = self.project.clone();
        if let Value::Map(snapshot) = self.user_config.snapshot() {
            merge::merge_layer(&mut local, snapshot, &self.policy);
        }

        let mut merged = self.defaults.clone();
        merge::merge_layer(&mut merged, local, &self.policy);
        merge::merge_layer(&mut merged, self.overrides.clone(), &self.policy);

        self.config = Arc::new(ResolvedConfig::new(merged));
        tracing::debug!("resolved configuration updated");
    }
}

impl fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("project_config_path", &self.project_config_path)
            .field("overrides", &self.overrides)
            .field("config", &self.config)
            .field("source", &"<source>")
            .finish_non_exhaustive()
    }
}

/// Project sources must produce mappings; anything else is ignored with a
/// warning so a malformed optional file cannot fail the build.
fn coerce_project_map(loaded: Value) -> Map {
    match loaded {
        Value::Map(map) => map,
        _ => {
            tracing::warn!("project configuration did not produce a mapping; ignoring it");
            Map::new()
        }
    }
}
