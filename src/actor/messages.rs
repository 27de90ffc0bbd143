//! Command definitions.
//!
//! Commands are intents, not payloads: the preview loop re-reads the
//! filesystem when it executes one, so a queued command never goes stale.

/// Messages to the preview loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// The archive changed: re-stage, re-open and re-extract
    Reload,
    /// A fragment changed: repack the archive
    Update,
    /// Close the viewer and stop
    Quit,
}
