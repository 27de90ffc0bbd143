//! Synchronization between the docx package and its extracted parts.
//!
//! ```text
//!            stage_preview            extract
//! doc.docx ───────────────► preview   ───────► doc.docx__extracted/
//!     ▲                                              │
//!     └──────────────────── repack ◄─────────────────┘
//! ```
//!
//! Only the preview loop calls into this module, one command at a time, so
//! the archive and the extraction directory never see concurrent writers.

mod error;
mod extract;
mod repack;

#[cfg(test)]
pub(crate) mod fixtures;

use std::fs;
use std::sync::Arc;

pub use error::{FragmentError, SyncError};

use crate::core::PathSet;
use crate::freshness::{ChangeWatcher, WatchLease};
use crate::{debug, utils::xml};
use error::io_at;

/// Result of an extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractReport {
    /// Files unpacked from the archive.
    pub entries: usize,
    /// Fragments pretty-printed in place.
    pub fragments: usize,
}

/// Result of an update request.
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The archive was rewritten with this many entries.
    Repacked { entries: usize },
    /// A fragment does not parse; the archive was left alone.
    Skipped(FragmentError),
}

/// Extract and repack operations over one document.
pub struct SyncEngine {
    paths: Arc<PathSet>,
    fragments: Arc<ChangeWatcher>,
}

impl SyncEngine {
    /// `fragments` must watch `paths.fragments()`.
    pub fn new(paths: Arc<PathSet>, fragments: Arc<ChangeWatcher>) -> Self {
        Self { paths, fragments }
    }

    pub fn paths(&self) -> &PathSet {
        &self.paths
    }

    /// Copy the archive verbatim to the preview path.
    pub fn stage_preview(&self) -> Result<u64, SyncError> {
        let source = self.paths.document();
        let target = self.paths.preview_copy();
        let bytes = fs::copy(source, target).map_err(io_at(target))?;
        debug!("sync"; "staged {} ({} bytes)", target.display(), bytes);
        Ok(bytes)
    }

    /// Unpack the archive and pretty-print the fragments.
    ///
    /// The fragment watcher is suppressed for the whole write and restarted
    /// with a fresh baseline afterwards, whether or not extraction succeeded.
    pub fn extract(&self) -> Result<ExtractReport, SyncError> {
        let _lease: WatchLease<'_> = self.fragments.lease();

        let entries = extract::unzip_into(self.paths.document(), self.paths.extraction_dir())?;
        let fragments = extract::normalize_fragments(self.paths.fragments())?;

        debug!("sync"; "extracted {} entries, normalized {} fragments", entries, fragments);
        Ok(ExtractReport { entries, fragments })
    }

    /// Check that every present fragment parses.
    pub fn check_fragments(&self) -> Result<(), SyncError> {
        for path in self.paths.fragments() {
            let Some(bytes) = extract::read_fragment(path)? else {
                continue;
            };
            xml::validate(&bytes).map_err(|source| FragmentError {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Rewrite the archive from the extraction directory.
    pub fn repack(&self) -> Result<usize, SyncError> {
        let entries =
            repack::write_archive(self.paths.document(), self.paths.extraction_dir())?;
        debug!("sync"; "repacked {} entries into {}", entries, self.paths.document().display());
        Ok(entries)
    }

    /// Repack unless a fragment is mid-edit and does not parse.
    pub fn update(&self) -> Result<UpdateOutcome, SyncError> {
        match self.check_fragments() {
            Ok(()) => {}
            Err(SyncError::Fragment(err)) => return Ok(UpdateOutcome::Skipped(err)),
            Err(err) => return Err(err),
        }
        let entries = self.repack()?;
        Ok(UpdateOutcome::Repacked { entries })
    }
}
