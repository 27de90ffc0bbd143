//! Recording application for preview loop tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use super::{AppError, Application, DocumentId};

/// What the application saw, shared with the test after the loop consumed it.
#[derive(Debug, Default)]
pub struct AppLog {
    pub opened: Vec<PathBuf>,
    pub closed: Vec<DocumentId>,
    pub max_open: usize,
    pub quit_calls: usize,
}

pub struct RecordingApp {
    log: Arc<Mutex<AppLog>>,
    alive: Arc<AtomicBool>,
    open: Vec<DocumentId>,
    next_id: u64,
    /// Simulate a viewer that already dropped its documents.
    pub forget_documents: bool,
}

impl RecordingApp {
    pub fn new() -> (Self, Arc<Mutex<AppLog>>, Arc<AtomicBool>) {
        let log = Arc::new(Mutex::new(AppLog::default()));
        let alive = Arc::new(AtomicBool::new(true));
        let app = Self {
            log: Arc::clone(&log),
            alive: Arc::clone(&alive),
            open: Vec::new(),
            next_id: 1,
            forget_documents: false,
        };
        (app, log, alive)
    }
}

impl Application for RecordingApp {
    type Document = DocumentId;

    fn open(&mut self, path: &Path) -> Result<DocumentId, AppError> {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        self.open.push(id);

        let mut log = self.log.lock();
        log.opened.push(path.to_path_buf());
        log.max_open = log.max_open.max(self.open.len());
        Ok(id)
    }

    fn is_open(&mut self, document: &DocumentId) -> bool {
        !self.forget_documents && self.open.contains(document)
    }

    fn close(&mut self, document: DocumentId) -> Result<(), AppError> {
        if self.forget_documents {
            self.open.retain(|id| *id != document);
            return Err(AppError::NotOpen(document));
        }
        let before = self.open.len();
        self.open.retain(|id| *id != document);
        if self.open.len() == before {
            return Err(AppError::NotOpen(document));
        }
        self.log.lock().closed.push(document);
        Ok(())
    }

    fn quit(&mut self) -> Result<(), AppError> {
        self.log.lock().quit_calls += 1;
        self.open.clear();
        if self.alive.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::Gone("already exited".into()))
        }
    }

    fn check_alive(&mut self) -> Result<(), AppError> {
        if self.alive.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::Gone("closed by operator".into()))
        }
    }
}
