//! Process-wide shutdown state.
//!
//! Ctrl+C is turned into a `Quit` command so the preview loop can close the
//! viewer. A second Ctrl+C while that is still running exits immediately.

use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::Sender;

use crate::actor::messages::Command;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Setup the global Ctrl+C handler. Call once, before spawning the loops.
pub fn setup_shutdown_handler(commands: Sender<Command>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        if SHUTDOWN.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }
        crate::log!("preview"; "interrupted, quitting..");
        if commands.send(Command::Quit).is_err() {
            // Preview loop already gone; nothing left to close
            std::process::exit(130);
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
