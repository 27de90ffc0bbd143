//! Mtime lookups for polled change detection.

use std::path::Path;
use std::time::SystemTime;

/// Get the modification time of a file
///
/// Returns `None` if the file doesn't exist or mtime cannot be read
pub fn get_mtime(path: &Path) -> Option<SystemTime> {
    path.metadata().and_then(|m| m.modified()).ok()
}
