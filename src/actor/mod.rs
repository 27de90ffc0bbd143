//! Loops of the live-reload session.
//!
//! ```text
//! WatchLoop --Reload/Update--+
//!  (poll)                    |
//!                            +--> Command channel --> PreviewLoop --> SyncEngine
//! InputLoop --Reload/Quit----+                          (viewer)      (archive)
//!  (stdin)                   |
//! Ctrl+C ------Quit----------+
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Commands sent to the preview loop
//! - `watch` - Polls the archive and fragment watchers
//! - `input` - Reads operator commands from stdin
//! - `preview` - Owns the viewer and executes commands one at a time
//! - `coordinator` - Wires up and runs the loops

pub mod coordinator;
pub mod input;
pub mod messages;
pub mod preview;
pub mod watch;

pub use coordinator::Coordinator;
