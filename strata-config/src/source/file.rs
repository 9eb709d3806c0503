//! File-backed project configuration.

use camino::{Utf8Path, Utf8PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::user_config::UserConfig;
use crate::value::Value;

use super::ConfigSource;

/// Project configuration file names probed by [`FileSource::discover`], in
/// preference order.
pub const CANDIDATE_FILE_NAMES: [&str; 2] = [".strata.toml", "strata.toml"];

/// Reads project configuration from disk.
///
/// Files parse by extension: `.json` through `serde_json`, anything else as
/// TOML. A missing file loads as `Ok(None)`. Relative paths resolve against
/// the working directory, matching where project configuration files live.
#[derive(Clone, Copy, Debug, Default)]
pub struct FileSource;

impl FileSource {
    /// The first candidate file name present in the working directory.
    ///
    /// Returns the relative candidate name so later loads re-resolve it,
    /// keeping behaviour stable when the working directory changes between
    /// discovery and resolution.
    #[must_use]
    pub fn discover() -> Option<Utf8PathBuf> {
        CANDIDATE_FILE_NAMES
            .iter()
            .map(Utf8PathBuf::from)
            .find(|candidate| {
                resolve_against_cwd(candidate).is_ok_and(|resolved| resolved.is_file())
            })
    }
}

impl ConfigSource for FileSource {
    fn load(&self, path: &Utf8Path, _api: &mut UserConfig) -> ConfigResult<Option<Value>> {
        let resolved = resolve_against_cwd(path)?;
        if !resolved.is_file() {
            return Ok(None);
        }
        let data = std::fs::read_to_string(&resolved)
            .map_err(|source| ConfigError::source_error(resolved.clone(), source))?;
        parse_by_extension(&resolved, &data).map(Some)
    }
}

fn resolve_against_cwd(path: &Utf8Path) -> ConfigResult<Utf8PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_owned());
    }
    let current = std::env::current_dir()
        .map_err(|source| ConfigError::source_error(path.to_owned(), source))?;
    let current_utf8 = Utf8PathBuf::from_path_buf(current).map_err(|non_utf8| {
        ConfigError::source_error(
            path.to_owned(),
            format!("working directory {} is not valid UTF-8", non_utf8.display()),
        )
    })?;
    Ok(current_utf8.join(path))
}

fn parse_by_extension(path: &Utf8Path, data: &str) -> ConfigResult<Value> {
    let extension = path.extension().map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("json") => serde_json::from_str::<serde_json::Value>(data)
            .map(Value::from)
            .map_err(|source| ConfigError::source_error(path.to_owned(), source)),
        _ => toml::from_str::<toml::Value>(data)
            .map(Value::from)
            .map_err(|source| ConfigError::source_error(path.to_owned(), source)),
    }
}
