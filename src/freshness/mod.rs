//! Change detection by modification time.
//!
//! - `mtime`: reading timestamps
//! - `watcher`: polled watch sets with a suppression lease

pub mod mtime;
mod watcher;

pub use watcher::{ChangeWatcher, WatchLease};
