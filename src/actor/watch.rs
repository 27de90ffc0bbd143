//! Watch Loop
//!
//! Turns watcher drift into commands on a fixed cadence:
//!
//! ```text
//! archive changed   -> Reload
//! fragments changed -> Update
//! ```
//!
//! Both watchers are polled every tick, archive first, so a tick that sees
//! both yields `Reload` before `Update`.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crossbeam::channel::Sender;

use super::messages::Command;
use crate::debug;
use crate::freshness::ChangeWatcher;

pub struct WatchLoop {
    archive: Arc<ChangeWatcher>,
    fragments: Arc<ChangeWatcher>,
    commands: Sender<Command>,
    interval: Duration,
}

impl WatchLoop {
    pub fn new(
        archive: Arc<ChangeWatcher>,
        fragments: Arc<ChangeWatcher>,
        commands: Sender<Command>,
        interval: Duration,
    ) -> Self {
        Self {
            archive,
            fragments,
            commands,
            interval,
        }
    }

    /// One tick: poll both watchers and return the resulting commands.
    pub fn poll_once(&self) -> Vec<Command> {
        let mut commands = Vec::with_capacity(2);
        if self.archive.changed() {
            debug!("watch"; "{} changed", self.archive.label());
            commands.push(Command::Reload);
        }
        if self.fragments.changed() {
            debug!("watch"; "{} changed", self.fragments.label());
            commands.push(Command::Update);
        }
        commands
    }

    /// Poll until the preview loop stops receiving.
    pub fn run(self) {
        loop {
            for command in self.poll_once() {
                if self.commands.send(command).is_err() {
                    debug!("watch"; "preview loop gone, stopping");
                    return;
                }
            }
            thread::sleep(self.interval);
        }
    }
}
