//! The external application that renders the preview.
//!
//! The preview loop drives it through [`Application`] only, so the rest of
//! the crate never knows how a document is actually shown.

#[cfg(test)]
pub mod mock;
mod viewer;

use std::fmt;
use std::path::Path;

use thiserror::Error;

pub use viewer::ViewerApp;

/// Identifies one opened preview document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(pub u64);

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Errors reported by the application.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to launch viewer: {0}")]
    Launch(String),

    #[error("document {0} is not open")]
    NotOpen(DocumentId),

    /// The application can no longer be reached; terminal for the preview.
    #[error("viewer is gone ({0})")]
    Gone(String),

    #[error("viewer io error")]
    Io(#[from] std::io::Error),
}

/// Automation surface of the word processor.
pub trait Application {
    type Document;

    /// Open `path` for display.
    fn open(&mut self, path: &Path) -> Result<Self::Document, AppError>;

    /// Whether the application still tracks `document` as open.
    fn is_open(&mut self, document: &Self::Document) -> bool;

    /// Close `document`. Fails if it is already closed.
    fn close(&mut self, document: Self::Document) -> Result<(), AppError>;

    /// Shut the application down. Fails if it is already gone.
    fn quit(&mut self) -> Result<(), AppError>;

    /// `Err(AppError::Gone)` once the application has been closed externally.
    fn check_alive(&mut self) -> Result<(), AppError>;
}
