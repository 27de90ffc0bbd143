//! Synchronization error types.

use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils::xml::XmlError;

/// Extract/repack failures.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("IO error at `{path}`")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid package `{path}`")]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("failed to walk `{path}`")]
    Walk {
        path: PathBuf,
        #[source]
        source: jwalk::Error,
    },

    #[error(transparent)]
    Fragment(#[from] FragmentError),
}

/// A watched fragment that does not parse.
#[derive(Debug, Error)]
#[error("`{path}` is not well-formed")]
pub struct FragmentError {
    pub path: PathBuf,
    #[source]
    pub source: XmlError,
}

pub(super) fn io_at(path: &Path) -> impl FnOnce(std::io::Error) -> SyncError + '_ {
    move |source| SyncError::Io {
        path: path.to_path_buf(),
        source,
    }
}

pub(super) fn zip_at(path: &Path) -> impl FnOnce(zip::result::ZipError) -> SyncError + '_ {
    move |source| SyncError::Zip {
        path: path.to_path_buf(),
        source,
    }
}
