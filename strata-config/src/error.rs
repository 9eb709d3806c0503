//! Error types produced during configuration registration and resolution.

use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias for results carrying a [`ConfigError`].
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors that can occur while registering configuration or resolving the
/// merged configuration.
///
/// The resolver distinguishes two classes: errors raised by project
/// configuration code itself (duplicate collections, version mismatches,
/// failing plugins or listeners) stop resolution and propagate to the caller,
/// while [`ConfigError::Source`] failures are logged and absorbed so a broken
/// optional project file cannot block an otherwise valid default build. See
/// [`ConfigError::is_recoverable`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// A collection was registered under a name that already exists.
    #[error("collection '{name}' is already registered; pick a different name")]
    DuplicateCollection {
        /// Name of the rejected collection registration.
        name: String,
    },

    /// The running tool version does not satisfy a requested range.
    #[error("this project requires a strata version matching '{requirement}' but found {running}")]
    VersionMismatch {
        /// The semantic-version range requested by the project configuration.
        requirement: String,
        /// The version of the running tool.
        running: semver::Version,
    },

    /// A version range handed to `version_check` could not be parsed.
    #[error("invalid version requirement '{requirement}': {source}")]
    InvalidVersionRequirement {
        /// The requirement string that failed to parse.
        requirement: String,
        /// Parse error reported by the `semver` crate.
        #[source]
        source: semver::Error,
    },

    /// Reading or parsing a project configuration source failed.
    #[error("project configuration error in '{path}': {source}")]
    Source {
        /// Path of the configuration source that failed.
        path: Utf8PathBuf,
        /// Underlying I/O or parse error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An event listener returned an error during dispatch.
    #[error("listener for event '{event}' failed: {source}")]
    Listener {
        /// Name of the event being dispatched.
        event: String,
        /// Error returned by the listener.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A value failed validation while building configuration.
    #[error("validation failed for '{key}': {message}")]
    Validation {
        /// Configuration key or API surface that failed validation.
        key: String,
        /// Human-readable explanation of the failure.
        message: String,
    },
}

impl ConfigError {
    /// Construct a [`ConfigError::Source`] for a configuration path.
    #[must_use]
    pub fn source_error(
        path: impl Into<Utf8PathBuf>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Source {
            path: path.into(),
            source: source.into(),
        }
    }

    /// Whether the resolver may absorb this error and continue with an empty
    /// project configuration.
    ///
    /// Only [`ConfigError::Source`] is recoverable: a missing or broken
    /// project file downgrades to the default build. Everything else reports
    /// programmer error in the project configuration and must stop
    /// resolution.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Source { .. })
    }
}
