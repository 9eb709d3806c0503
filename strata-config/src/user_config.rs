//! The registration store threaded through project configuration code.
//!
//! A [`UserConfig`] is the API surface handed to project configuration
//! sources and plugins. Registrations accumulate here during evaluation;
//! the resolver then reads them back through [`UserConfig::snapshot`] and
//! merges them over the project mapping. The host owns exactly one store
//! per build invocation and passes it by reference wherever registration
//! happens.
//!
//! Re-registering a name overwrites the previous entry and logs a warning,
//! with one exception: collections reject duplicates outright, keeping the
//! first handler. Overwrite returns the replaced entry so callers can
//! observe the supersession.

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use semver::{Version, VersionReq};

use crate::error::{ConfigError, ConfigResult};
use crate::events::{EventBus, ListenerResult};
use crate::formats::TemplateFormats;
use crate::handler::Handler;
use crate::keys;
use crate::value::{Map, Value};

static RUNNING_VERSION: LazyLock<Version> = LazyLock::new(|| {
    Version::parse(env!("CARGO_PKG_VERSION")).unwrap_or_else(|_| Version::new(0, 0, 0))
});

/// Destination category for a Tera filter registration.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FilterKind {
    /// Synchronous filters, invoked inline during rendering.
    Sync,
    /// Asynchronous filters, awaited by the engine.
    Async,
}

/// A reusable bundle of registrations applied via [`UserConfig::add_plugin`].
///
/// Implemented for free by any `FnOnce(&mut UserConfig) -> ConfigResult<()>`
/// closure. Plugins run synchronously the moment they are added and may
/// themselves add further plugins.
pub trait Plugin {
    /// Perform this plugin's registrations against `config`.
    ///
    /// # Errors
    ///
    /// Returns any error the plugin's registrations produce; the error
    /// propagates out of [`UserConfig::add_plugin`] unchanged.
    fn apply(self, config: &mut UserConfig) -> ConfigResult<()>;
}

impl<F> Plugin for F
where
    F: FnOnce(&mut UserConfig) -> ConfigResult<()>,
{
    fn apply(self, config: &mut UserConfig) -> ConfigResult<()> {
        self(config)
    }
}

/// Accumulates template engine registrations made by project configuration
/// code, plus the event bus and declared template formats.
#[derive(Debug, Default)]
pub struct UserConfig {
    liquid_tags: BTreeMap<String, Handler>,
    liquid_filters: BTreeMap<String, Handler>,
    liquid_options: Option<Value>,
    tera_filters: BTreeMap<String, Handler>,
    tera_async_filters: BTreeMap<String, Handler>,
    handlebars_helpers: BTreeMap<String, Handler>,
    transforms: BTreeMap<String, Handler>,
    layout_aliases: BTreeMap<String, String>,
    passthrough_copies: BTreeMap<String, bool>,
    library_overrides: BTreeMap<String, Handler>,
    markdown_options: Option<Value>,
    template_formats: Option<TemplateFormats>,
    collections: BTreeMap<String, Handler>,
    events: EventBus,
}

impl UserConfig {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener` to `event`, after any existing listeners.
    pub fn on(
        &mut self,
        event: impl Into<String>,
        listener: impl FnMut(&[Value]) -> ListenerResult + Send + 'static,
    ) {
        self.events.on(event, listener);
    }

    /// Dispatch `event` to its listeners in registration order, passing
    /// `args` to each.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Listener`] wrapping the first listener
    /// failure; listeners registered after the failing one are skipped.
    pub fn emit(&mut self, event: &str, args: &[Value]) -> ConfigResult<()> {
        self.events.emit(event, args)
    }

    /// Assert that the running tool satisfies a semantic-version range.
    ///
    /// Pure validation with no side effects, for project configurations
    /// that rely on newer configuration surface.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidVersionRequirement`] when the range
    /// fails to parse and [`ConfigError::VersionMismatch`] when the running
    /// version falls outside it.
    #[expect(
        clippy::unused_self,
        reason = "version checking belongs to the registration surface handed to project code"
    )]
    pub fn version_check(&self, requirement: &str) -> ConfigResult<()> {
        let range = VersionReq::parse(requirement).map_err(|source| {
            ConfigError::InvalidVersionRequirement {
                requirement: requirement.to_owned(),
                source,
            }
        })?;
        if range.matches(&RUNNING_VERSION) {
            Ok(())
        } else {
            Err(ConfigError::VersionMismatch {
                requirement: requirement.to_owned(),
                running: RUNNING_VERSION.clone(),
            })
        }
    }

    /// Register a Liquid tag factory under `name`, returning any replaced
    /// handler.
    pub fn add_liquid_tag<F>(&mut self, name: impl Into<String>, factory: F) -> Option<Handler>
    where
        F: Fn(&[Value]) -> ConfigResult<Value> + Send + Sync + 'static,
    {
        register(
            "liquid tag",
            &mut self.liquid_tags,
            name.into(),
            Handler::from_fn(factory),
        )
    }

    /// Register a Liquid filter under `name`, returning any replaced
    /// handler.
    pub fn add_liquid_filter<F>(&mut self, name: impl Into<String>, filter: F) -> Option<Handler>
    where
        F: Fn(&[Value]) -> ConfigResult<Value> + Send + Sync + 'static,
    {
        register(
            "liquid filter",
            &mut self.liquid_filters,
            name.into(),
            Handler::from_fn(filter),
        )
    }

    /// Register a Tera filter under `name`, routed to the synchronous or
    /// asynchronous category by `kind`.
    pub fn add_tera_filter<F>(
        &mut self,
        name: impl Into<String>,
        filter: F,
        kind: FilterKind,
    ) -> Option<Handler>
    where
        F: Fn(&[Value]) -> ConfigResult<Value> + Send + Sync + 'static,
    {
        self.add_tera_handler(name.into(), Handler::from_fn(filter), kind)
    }

    /// Register an asynchronous Tera filter under `name`.
    pub fn add_tera_async_filter<F>(&mut self, name: impl Into<String>, filter: F) -> Option<Handler>
    where
        F: Fn(&[Value]) -> ConfigResult<Value> + Send + Sync + 'static,
    {
        self.add_tera_handler(name.into(), Handler::from_fn(filter), FilterKind::Async)
    }

    /// Register a Handlebars helper under `name`, returning any replaced
    /// handler.
    pub fn add_handlebars_helper<F>(&mut self, name: impl Into<String>, helper: F) -> Option<Handler>
    where
        F: Fn(&[Value]) -> ConfigResult<Value> + Send + Sync + 'static,
    {
        register(
            "handlebars helper",
            &mut self.handlebars_helpers,
            name.into(),
            Handler::from_fn(helper),
        )
    }

    /// Register `filter` for every template engine at once.
    ///
    /// Fans out to the Liquid filter, synchronous Tera filter, and
    /// Handlebars helper categories under the same name; each category
    /// applies its overwrite rule independently, and all three entries
    /// share one handler identity.
    pub fn add_filter<F>(&mut self, name: impl Into<String>, filter: F)
    where
        F: Fn(&[Value]) -> ConfigResult<Value> + Send + Sync + 'static,
    {
        let shared = name.into();
        let handler = Handler::from_fn(filter);
        tracing::debug!(name = %shared, "adding universal filter");
        register(
            "liquid filter",
            &mut self.liquid_filters,
            shared.clone(),
            handler.clone(),
        );
        register(
            "tera filter",
            &mut self.tera_filters,
            shared.clone(),
            handler.clone(),
        );
        register(
            "handlebars helper",
            &mut self.handlebars_helpers,
            shared,
            handler,
        );
    }

    /// Register an output transform under `name`, returning any replaced
    /// handler.
    pub fn add_transform<F>(&mut self, name: impl Into<String>, transform: F) -> Option<Handler>
    where
        F: Fn(&[Value]) -> ConfigResult<Value> + Send + Sync + 'static,
    {
        register(
            "transform",
            &mut self.transforms,
            name.into(),
            Handler::from_fn(transform),
        )
    }

    /// Alias layout name `from` to `to`, returning any replaced target.
    pub fn add_layout_alias(
        &mut self,
        from: impl Into<String>,
        to: impl Into<String>,
    ) -> Option<String> {
        register(
            "layout alias",
            &mut self.layout_aliases,
            from.into(),
            to.into(),
        )
    }

    /// Register the collection `name`.
    ///
    /// Collections are consumed through [`UserConfig::collections`], never
    /// through the merged configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DuplicateCollection`] when `name` is already
    /// registered; the existing handler is left untouched.
    pub fn add_collection<F>(&mut self, name: impl Into<String>, collection: F) -> ConfigResult<()>
    where
        F: Fn(&[Value]) -> ConfigResult<Value> + Send + Sync + 'static,
    {
        let owned = name.into();
        if self.collections.contains_key(&owned) {
            return Err(ConfigError::DuplicateCollection { name: owned });
        }
        self.collections.insert(owned, Handler::from_fn(collection));
        Ok(())
    }

    /// Registered collections, keyed by name.
    #[must_use]
    pub const fn collections(&self) -> &BTreeMap<String, Handler> {
        &self.collections
    }

    /// Apply `plugin` immediately, letting it register against this store.
    ///
    /// Plugins run synchronously and may themselves call `add_plugin`.
    ///
    /// # Errors
    ///
    /// Propagates any error the plugin returns.
    pub fn add_plugin(&mut self, plugin: impl Plugin) -> ConfigResult<()> {
        plugin.apply(self)
    }

    /// Mark `path` to be copied verbatim into the build output.
    ///
    /// Adding a path that is already marked changes nothing and logs
    /// nothing. Returns `&mut Self` so registrations can be chained.
    pub fn add_passthrough_copy(&mut self, path: impl Into<String>) -> &mut Self {
        self.passthrough_copies.insert(path.into(), true);
        self
    }

    /// Declare the build's template formats, replacing any previous
    /// declaration.
    ///
    /// Accepts an explicit sequence or a comma-separated string; see
    /// [`TemplateFormats`].
    pub fn set_template_formats(&mut self, formats: impl Into<TemplateFormats>) {
        self.template_formats = Some(formats.into());
    }

    /// The declared template formats, when any have been set.
    #[must_use]
    pub const fn template_formats(&self) -> Option<&TemplateFormats> {
        self.template_formats.as_ref()
    }

    /// Override the template engine registered under `engine` with a
    /// caller-constructed instance, returning any replaced override.
    ///
    /// Engine names are stored lowercased. Overriding the Liquid engine
    /// after options were set through [`UserConfig::set_liquid_options`]
    /// logs a warning, since the instance supersedes those options; both
    /// values are retained and consumers decide precedence.
    pub fn set_library<T>(&mut self, engine: impl Into<String>, instance: T) -> Option<Handler>
    where
        T: Any + Send + Sync,
    {
        let lowercased = engine.into().to_lowercase();
        if lowercased == "liquid" && self.liquid_options.is_some() {
            tracing::warn!(
                engine = %lowercased,
                "library override supersedes options set with `set_liquid_options`; pass them to the instance instead"
            );
        }
        register(
            "library override",
            &mut self.library_overrides,
            lowercased,
            Handler::instance(instance),
        )
    }

    /// Set the options object handed to the Liquid engine, replacing any
    /// previous value wholesale.
    pub fn set_liquid_options(&mut self, options: impl Into<Value>) {
        self.liquid_options = Some(options.into());
    }

    /// Set the options object handed to the markdown engine, replacing any
    /// previous value wholesale.
    pub fn set_markdown_options(&mut self, options: impl Into<Value>) {
        self.markdown_options = Some(options.into());
    }

    /// Point-in-time view of every registration category, shaped for the
    /// resolver's merge.
    ///
    /// Handler values are shared by reference rather than deep-copied, and
    /// `template_formats` appears only when declared so an undeclared store
    /// cannot mask lower layers. Collections are deliberately absent; see
    /// [`UserConfig::collections`].
    #[must_use]
    pub fn snapshot(&self) -> Value {
        let mut view = Map::new();
        if let Some(formats) = &self.template_formats {
            view.insert(
                keys::TEMPLATE_FORMATS.to_owned(),
                Value::from(formats.clone()),
            );
        }
        view.insert(keys::LIQUID_TAGS.to_owned(), handler_map(&self.liquid_tags));
        view.insert(
            keys::LIQUID_FILTERS.to_owned(),
            handler_map(&self.liquid_filters),
        );
        view.insert(
            keys::LIQUID_OPTIONS.to_owned(),
            self.liquid_options.clone().unwrap_or_else(empty_map),
        );
        view.insert(keys::TERA_FILTERS.to_owned(), handler_map(&self.tera_filters));
        view.insert(
            keys::TERA_ASYNC_FILTERS.to_owned(),
            handler_map(&self.tera_async_filters),
        );
        view.insert(
            keys::HANDLEBARS_HELPERS.to_owned(),
            handler_map(&self.handlebars_helpers),
        );
        view.insert(keys::TRANSFORMS.to_owned(), handler_map(&self.transforms));
        view.insert(
            keys::LAYOUT_ALIASES.to_owned(),
            string_map(&self.layout_aliases),
        );
        view.insert(
            keys::PASSTHROUGH_COPIES.to_owned(),
            flag_map(&self.passthrough_copies),
        );
        view.insert(
            keys::LIBRARY_OVERRIDES.to_owned(),
            handler_map(&self.library_overrides),
        );
        view.insert(
            keys::MARKDOWN_OPTIONS.to_owned(),
            self.markdown_options.clone().unwrap_or_else(empty_map),
        );
        Value::Map(view)
    }

    fn add_tera_handler(
        &mut self,
        name: String,
        handler: Handler,
        kind: FilterKind,
    ) -> Option<Handler> {
        match kind {
            FilterKind::Sync => register("tera filter", &mut self.tera_filters, name, handler),
            FilterKind::Async => register(
                "tera async filter",
                &mut self.tera_async_filters,
                name,
                handler,
            ),
        }
    }
}

/// Insert `value` under `name`, logging when an existing registration is
/// overwritten, and return the replaced entry.
fn register<V>(
    category: &'static str,
    entries: &mut BTreeMap<String, V>,
    name: String,
    value: V,
) -> Option<V> {
    if entries.contains_key(&name) {
        tracing::warn!(category, name = %name, "overwriting an existing registration");
    }
    entries.insert(name, value)
}

const fn empty_map() -> Value {
    Value::Map(Map::new())
}

fn handler_map(entries: &BTreeMap<String, Handler>) -> Value {
    Value::Map(
        entries
            .iter()
            .map(|(name, handler)| (name.clone(), Value::Handler(handler.clone())))
            .collect(),
    )
}

fn string_map(entries: &BTreeMap<String, String>) -> Value {
    Value::Map(
        entries
            .iter()
            .map(|(from, to)| (from.clone(), Value::String(to.clone())))
            .collect(),
    )
}

fn flag_map(entries: &BTreeMap<String, bool>) -> Value {
    Value::Map(
        entries
            .iter()
            .map(|(path, enabled)| (path.clone(), Value::Bool(*enabled)))
            .collect(),
    )
}
