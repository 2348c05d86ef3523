//! Best-effort deletion of extracted files when the process exits.
//!
//! A loaded module may need its backing file for as long as it is mapped, so
//! extracted copies are only removed from a C `atexit` hook. Failures there are
//! ignored: on Windows a DLL that is still loaded cannot be deleted at all.

use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, Once};

static EXIT_LIST: Lazy<ExitList> = Lazy::new(ExitList::default);
static HOOK: Once = Once::new();

/// A set of files to delete later.
#[derive(Debug, Default)]
pub struct ExitList {
    paths: Mutex<Vec<PathBuf>>,
}

impl ExitList {
    fn paths(&self) -> MutexGuard<'_, Vec<PathBuf>> {
        self.paths.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn register(&self, path: &Path) {
        let mut paths = self.paths();
        if !paths.iter().any(|p| p == path) {
            paths.push(path.to_path_buf());
        }
    }

    pub fn forget(&self, path: &Path) {
        self.paths().retain(|p| p != path);
    }

    pub fn snapshot(&self) -> Vec<PathBuf> {
        self.paths().clone()
    }

    /// Delete every listed file and clear the list. Returns how many were removed.
    pub fn remove_all(&self) -> usize {
        let paths: Vec<PathBuf> = self.paths().drain(..).collect();
        paths.iter().filter(|p| fs::remove_file(p).is_ok()).count()
    }
}

/// Schedule `path` for removal at process exit.
pub fn delete_on_exit(path: &Path) {
    HOOK.call_once(|| {
        let rc = unsafe { libc::atexit(run_exit_cleanup) };
        if rc != 0 {
            tracing::warn!(rc, "could not register exit cleanup hook; extracted files will be left behind");
        }
    });
    EXIT_LIST.register(path);
}

/// Drop `path` from the exit list (it was already removed).
pub fn forget(path: &Path) {
    EXIT_LIST.forget(path);
}

/// Paths currently scheduled for removal at exit.
pub fn pending() -> Vec<PathBuf> {
    EXIT_LIST.snapshot()
}

extern "C" fn run_exit_cleanup() {
    EXIT_LIST.remove_all();
}
