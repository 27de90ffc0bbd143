//! Preview Loop
//!
//! Sole owner of the viewer and the only writer of the archive and the
//! extraction directory. Executes commands strictly one at a time.
//!
//! ```text
//!          seed Reload                Quit / viewer gone
//!  Idle ─────────────────► Previewing ───────────────────► Idle
//!                           │     ▲
//!                           └─────┘ Reload / Update
//! ```
//!
//! Between commands the loop wakes every heartbeat to ask the viewer
//! whether it is still alive. A dead viewer is handled exactly like `Quit`.


use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, RecvTimeoutError};

use super::messages::Command;
use crate::app::Application;
use crate::freshness::ChangeWatcher;
use crate::sync::{SyncEngine, UpdateOutcome};
use crate::{debug, log, logger};

/// Whether the loop keeps receiving after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

pub struct PreviewLoop<A: Application> {
    engine: SyncEngine,
    /// Started after the first preview is up
    archive: Arc<ChangeWatcher>,
    app: A,
    commands: Receiver<Command>,
    heartbeat: Duration,
    document: Option<A::Document>,
}

impl<A: Application> PreviewLoop<A> {
    pub fn new(
        engine: SyncEngine,
        archive: Arc<ChangeWatcher>,
        app: A,
        commands: Receiver<Command>,
        heartbeat: Duration,
    ) -> Self {
        Self {
            engine,
            archive,
            app,
            commands,
            heartbeat,
            document: None,
        }
    }

    /// Seed the preview, then execute commands until `Quit`.
    ///
    /// On error the viewer is shut down best-effort before returning.
    pub fn run(mut self) -> Result<()> {
        if let Err(err) = self.reload() {
            report_failure(Command::Reload, &err);
            self.quit();
            return Err(err);
        }
        self.archive.start();
        debug!("preview"; "watching {}", self.engine.paths().document().display());

        loop {
            let command = self.next_command();
            match self.handle(command) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Stop) => return Ok(()),
                Err(err) => {
                    report_failure(command, &err);
                    self.quit();
                    return Err(err);
                }
            }
        }
    }

    /// Block for the next command, checking liveness on every heartbeat.
    fn next_command(&mut self) -> Command {
        loop {
            match self.commands.recv_timeout(self.heartbeat) {
                Ok(command) => return command,
                Err(RecvTimeoutError::Timeout) => {
                    if let Err(err) = self.app.check_alive() {
                        log!("preview"; "{}, quitting", err);
                        return Command::Quit;
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Command::Quit,
            }
        }
    }

    fn handle(&mut self, command: Command) -> Result<Flow> {
        debug!("preview"; "{:?}", command);
        match command {
            Command::Reload => self.reload().map(|()| Flow::Continue),
            Command::Update => self.update().map(|()| Flow::Continue),
            Command::Quit => {
                self.quit();
                Ok(Flow::Stop)
            }
        }
    }

    /// Replace the open preview with a fresh copy of the archive.
    fn reload(&mut self) -> Result<()> {
        self.close_document();

        let paths = self.engine.paths();
        self.engine.stage_preview().context("failed to stage preview")?;
        let document = self
            .app
            .open(paths.preview_copy())
            .with_context(|| format!("failed to open {}", paths.preview_copy().display()))?;
        self.document = Some(document);

        let report = self.engine.extract().context("failed to extract")?;
        logger::status_success(&format!(
            "reloaded {} ({} entries, {} fragments)",
            file_name(paths.document()),
            report.entries,
            report.fragments
        ));
        Ok(())
    }

    fn update(&mut self) -> Result<()> {
        match self.engine.update().context("failed to repack")? {
            UpdateOutcome::Repacked { entries } => {
                logger::status_success(&format!(
                    "repacked {} entries into {}",
                    entries,
                    file_name(self.engine.paths().document())
                ));
            }
            UpdateOutcome::Skipped(err) => {
                logger::status_warning(&format!(
                    "{}: {}\nupdate skipped until the next change",
                    err, err.source
                ));
            }
        }
        Ok(())
    }

    /// Close the tracked document if the viewer still has it. Best-effort.
    fn close_document(&mut self) {
        let Some(document) = self.document.take() else {
            return;
        };
        if !self.app.is_open(&document) {
            debug!("preview"; "previous document already closed");
            return;
        }
        if let Err(err) = self.app.close(document) {
            debug!("preview"; "close failed: {}", err);
        }
    }

    /// Close the document and the viewer. Best-effort.
    fn quit(&mut self) {
        self.close_document();
        if let Err(err) = self.app.quit() {
            debug!("preview"; "quit failed: {}", err);
        }
        log!("preview"; "stopped");
    }
}

fn report_failure(command: Command, err: &anyhow::Error) {
    let summary = match command {
        Command::Reload => "reload failed",
        Command::Update => "update failed",
        Command::Quit => "quit failed",
    };
    logger::status_error(summary, &format!("{err:#}"));
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
