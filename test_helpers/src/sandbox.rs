//! Scratch-directory sandbox for filesystem-driven tests.
//!
//! Discovery tests need a private directory they can populate with candidate
//! files and make current. [`in_scratch_dir`] centralises the setup: create a
//! temporary directory, switch the working directory there under the global
//! guard from [`crate::cwd`], and tear everything down once the closure
//! completes.

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};

use crate::cwd;

/// Runs `f` inside a fresh temporary directory made current for the call.
///
/// The previous working directory is restored and the directory deleted when
/// the closure finishes, whether or not it succeeded. Closure errors take
/// precedence over restoration errors.
///
/// # Errors
///
/// Returns an error if the sandbox cannot be set up or torn down, or
/// propagates the closure's own failure.
pub fn in_scratch_dir<F, T>(f: F) -> Result<T>
where
    F: FnOnce(&Utf8Path) -> Result<T>,
{
    let dir = tempfile::tempdir().context("create scratch dir")?;
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
        .map_err(|non_utf8| anyhow!("scratch dir is not valid UTF-8: {}", non_utf8.display()))?;
    let guard = cwd::set_dir(&root)?;
    let outcome = f(&root);
    let restored = guard.restore();
    drop(guard);
    let value = outcome?;
    restored.context("restore working directory")?;
    Ok(value)
}

/// Writes `contents` to `name` under `dir`, returning the file's full path.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_file(dir: &Utf8Path, name: &str, contents: &str) -> Result<Utf8PathBuf> {
    let path = dir.join(name);
    std::fs::write(&path, contents).with_context(|| format!("write {path}"))?;
    Ok(path)
}
