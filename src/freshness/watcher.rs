//! Polled watch sets.
//!
//! A `ChangeWatcher` remembers the last observed mtime of each path and
//! reports new drift once per poll. It starts stopped; a stopped watcher
//! never reports change and `start()` discards whatever drifted meanwhile.
//!
//! Writers that touch watched files hold a [`WatchLease`] for the duration
//! of the write so their own output is never reported as an edit:
//!
//! ```ignore
//! {
//!     let _lease = fragments.lease();   // stop
//!     write_fragments()?;               // not observed
//! }                                     // start, baseline = fresh mtimes
//! ```

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use parking_lot::Mutex;

use super::mtime::get_mtime;
use crate::{debug, log};

/// Polls modification times of a fixed, ordered set of paths.
pub struct ChangeWatcher {
    label: &'static str,
    state: Mutex<WatchState>,
}

struct WatchState {
    entries: Vec<WatchEntry>,
    stopped: bool,
}

struct WatchEntry {
    path: PathBuf,
    /// `None` while the file is absent.
    mtime: Option<SystemTime>,
}

impl ChangeWatcher {
    /// Create a stopped watcher over `paths`.
    pub fn new(label: &'static str, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        let entries = paths
            .into_iter()
            .map(|path| WatchEntry { path, mtime: None })
            .collect();
        Self {
            label,
            state: Mutex::new(WatchState {
                entries,
                stopped: true,
            }),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        let state = self.state.lock();
        state.entries.iter().map(|e| e.path.clone()).collect()
    }

    pub fn is_running(&self) -> bool {
        !self.state.lock().stopped
    }

    /// Capture current mtimes as the baseline and resume reporting.
    pub fn start(&self) {
        let mut state = self.state.lock();
        for entry in &mut state.entries {
            entry.mtime = get_mtime(&entry.path);
            if entry.mtime.is_none() {
                debug!("watch"; "{}: {} is missing at start", self.label, entry.path.display());
            }
        }
        state.stopped = false;
    }

    /// Stop reporting. Baselines are frozen until the next `start()`.
    pub fn stop(&self) {
        self.state.lock().stopped = true;
    }

    /// Stop the watcher until the returned lease is dropped.
    pub fn lease(&self) -> WatchLease<'_> {
        self.stop();
        WatchLease { watcher: self }
    }

    /// Report whether any path changed since the previous poll.
    ///
    /// Every baseline is replaced by the value observed now, so one edit is
    /// reported exactly once. A path that disappears is not a change; one
    /// that reappears is.
    pub fn changed(&self) -> bool {
        let mut state = self.state.lock();
        if state.stopped {
            return false;
        }

        let mut changed = false;
        for entry in &mut state.entries {
            let current = get_mtime(&entry.path);
            match (entry.mtime, current) {
                (Some(_), None) => warn_missing(self.label, &entry.path),
                (previous, current) if previous != current => changed = true,
                _ => {}
            }
            entry.mtime = current;
        }
        changed
    }
}

fn warn_missing(label: &str, path: &Path) {
    log!("warning"; "{}: {} disappeared, waiting for it to come back", label, path.display());
}

/// Suppresses a watcher while held; restarts it with a fresh baseline on drop.
#[must_use = "the watcher restarts as soon as the lease is dropped"]
pub struct WatchLease<'a> {
    watcher: &'a ChangeWatcher,
}

impl Drop for WatchLease<'_> {
    fn drop(&mut self) {
        self.watcher.start();
    }
}
