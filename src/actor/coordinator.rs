//! Coordinator - wires up the live-reload loops.
//!
//! Builds the watchers and the sync engine from one `PathSet`, hands each
//! loop the handles it needs, and runs the preview loop on the calling
//! thread. The watch and input threads are never joined; the process ends
//! when the preview loop returns.

use std::io;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use crossbeam::channel::{Receiver, Sender};

use super::input::{HINT, InputLoop};
use super::messages::Command;
use super::preview::PreviewLoop;
use super::watch::WatchLoop;
use crate::app::ViewerApp;
use crate::config::Settings;
use crate::core::PathSet;
use crate::freshness::ChangeWatcher;
use crate::sync::SyncEngine;
use crate::{debug, log};

pub struct Coordinator {
    paths: Arc<PathSet>,
    settings: Settings,
}

impl Coordinator {
    pub fn new(paths: Arc<PathSet>, settings: Settings) -> Self {
        Self { paths, settings }
    }

    /// Run until the operator quits or the viewer goes away.
    pub fn run(self, tx: Sender<Command>, rx: Receiver<Command>) -> Result<()> {
        let archive = Arc::new(ChangeWatcher::new(
            "docx",
            [self.paths.document().to_path_buf()],
        ));
        let fragments = Arc::new(ChangeWatcher::new(
            "xml",
            self.paths.fragments().to_vec(),
        ));

        for path in fragments.paths() {
            debug!("watch"; "fragment {}", path.display());
        }

        let watch = WatchLoop::new(
            Arc::clone(&archive),
            Arc::clone(&fragments),
            tx.clone(),
            self.settings.watch.interval(),
        );
        thread::Builder::new()
            .name("watch".into())
            .spawn(move || watch.run())
            .context("failed to spawn watch thread")?;

        log!("preview"; "{}", HINT);
        thread::Builder::new()
            .name("input".into())
            .spawn(move || InputLoop::new(io::stdin().lock(), tx).run())
            .context("failed to spawn input thread")?;

        let engine = SyncEngine::new(Arc::clone(&self.paths), fragments);
        let app = ViewerApp::new(self.settings.preview.command.clone());
        debug!("preview"; "viewer: {}", self.settings.preview.command.join(" "));

        PreviewLoop::new(engine, archive, app, rx, self.settings.preview.heartbeat()).run()
    }
}
