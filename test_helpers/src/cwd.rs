//! Helpers for safely mutating the process working directory in tests.
//!
//! Configuration discovery resolves candidate files against the working
//! directory, so tests that exercise it have to change directory. The working
//! directory is process-global state; this module serialises access through a
//! global mutex and hands out an RAII guard that puts the original directory
//! back when dropped.
//!
//! # Examples
//!
//! ```no_run
//! use test_helpers::cwd;
//!
//! let guard = cwd::set_dir("/tmp/scratch").expect("set cwd");
//! // The working directory is `/tmp/scratch` until `guard` drops.
//! ```

use std::sync::LazyLock;

use anyhow::{Context, Result, anyhow};
use camino::Utf8PathBuf;
use parking_lot::{Mutex, MutexGuard};

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(Mutex::default);

/// RAII guard that restores the working directory on drop.
#[must_use = "dropping restores the prior working directory"]
pub struct CwdGuard {
    original: Utf8PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl CwdGuard {
    /// Restores the original working directory without waiting for drop.
    ///
    /// Callers that can propagate errors should prefer this over [`Drop`],
    /// which swallows restoration failures.
    ///
    /// # Errors
    ///
    /// Returns an error if `set_current_dir` fails.
    pub fn restore(&self) -> std::io::Result<()> {
        std::env::set_current_dir(&self.original)
    }
}

impl Drop for CwdGuard {
    fn drop(&mut self) {
        // Failures surface through `restore()`; drop stays silent.
        let _unused = std::env::set_current_dir(&self.original);
    }
}

/// Makes `path` the working directory and returns a guard restoring the
/// previous one.
///
/// The global lock is held for the guard's lifetime, so no other test can
/// touch the working directory concurrently. The previous directory is read
/// and checked for UTF-8 before anything changes; a conversion failure leaves
/// the process where it was.
///
/// # Errors
///
/// Returns an error if the current directory cannot be read, is not valid
/// UTF-8, or `path` cannot be made current.
pub fn set_dir(path: impl AsRef<std::path::Path>) -> Result<CwdGuard> {
    let lock = CWD_LOCK.lock();
    let previous = std::env::current_dir().context("read current dir")?;
    let original = Utf8PathBuf::from_path_buf(previous)
        .map_err(|non_utf8| anyhow!("cwd is not valid UTF-8: {}", non_utf8.display()))?;
    std::env::set_current_dir(path.as_ref()).context("set current dir")?;
    Ok(CwdGuard {
        original,
        _lock: lock,
    })
}
