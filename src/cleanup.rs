//! Delete-on-exit bookkeeping for extracted files
//!
//! Removal is best-effort: it runs from an `atexit` hook on normal process exit and
//! never on abort or signal termination.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, Once, PoisonError};
use tracing::{debug, warn};

/// Paths scheduled for removal
#[derive(Debug, Default)]
pub struct CleanupRegistry {
    paths: Mutex<Vec<PathBuf>>,
}

impl CleanupRegistry {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            paths: Mutex::new(Vec::new()),
        }
    }

    /// Schedule a path for removal, ignoring duplicates
    pub fn register<P: AsRef<Path>>(&self, path: P) {
        let path = path.as_ref().to_path_buf();
        let mut paths = self.paths.lock().unwrap_or_else(PoisonError::into_inner);
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.paths.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        self.paths
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|p| p == path.as_ref())
    }

    /// Remove every registered file, most recent first, and forget them
    ///
    /// Returns how many files were actually removed. Files that are already gone or
    /// cannot be removed (e.g. a DLL still mapped on Windows) are skipped.
    pub fn purge(&self) -> usize {
        self.remove_all(|path, e| debug!("Could not remove {}: {}", path.display(), e))
    }

    /// Same as [`purge`](Self::purge) but without logging, for use once thread-locals
    /// may already be torn down
    pub fn purge_silently(&self) -> usize {
        self.remove_all(|_, _| {})
    }

    fn remove_all(&self, on_error: impl Fn(&Path, std::io::Error)) -> usize {
        let paths = std::mem::take(&mut *self.paths.lock().unwrap_or_else(PoisonError::into_inner));
        let mut removed = 0;
        for path in paths.iter().rev() {
            match fs::remove_file(path) {
                Ok(()) => removed += 1,
                Err(e) => on_error(path, e),
            }
        }
        removed
    }
}

static EXIT_REGISTRY: CleanupRegistry = CleanupRegistry::new();
static INSTALL_HOOK: Once = Once::new();

// Runs after thread-locals are destroyed, so no logging in here
extern "C" fn purge_at_exit() {
    EXIT_REGISTRY.purge_silently();
}

/// The registry drained when the process exits normally
#[must_use]
pub fn exit_registry() -> &'static CleanupRegistry {
    &EXIT_REGISTRY
}

/// Schedule `path` for deletion when the process exits normally
pub fn delete_on_exit<P: AsRef<Path>>(path: P) {
    INSTALL_HOOK.call_once(|| {
        // SAFETY: purge_at_exit only touches a static and never unwinds
        if unsafe { libc::atexit(purge_at_exit) } != 0 {
            warn!("Failed to install exit hook, extracted files will be left behind");
        }
    });
    EXIT_REGISTRY.register(path);
}
