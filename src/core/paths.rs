//! Filesystem locations derived from the document path.
//!
//! ```text
//! /docs/report.docx                       document (archive)
//! /docs/report__preview.docx              preview copy opened in the viewer
//! /docs/report.docx__extracted/           extraction directory
//! /docs/report.docx__extracted/word/*.xml watched fragments
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

const PREVIEW_SUFFIX: &str = "__preview";
const EXTRACTED_SUFFIX: &str = "__extracted";

/// Every path the tool touches, derived from one absolute document path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSet {
    document: PathBuf,
    preview_copy: PathBuf,
    extraction_dir: PathBuf,
    fragments: Vec<PathBuf>,
}

impl PathSet {
    /// `fragments` are `/`-separated entry names relative to the extraction dir.
    pub fn new<S: AsRef<str>>(document: &Path, fragments: &[S]) -> Self {
        let extraction_dir = suffixed_name(document, EXTRACTED_SUFFIX);
        let fragments = fragments
            .iter()
            .map(|entry| {
                entry
                    .as_ref()
                    .split('/')
                    .filter(|part| !part.is_empty())
                    .fold(extraction_dir.clone(), |dir, part| dir.join(part))
            })
            .collect();

        Self {
            document: document.to_path_buf(),
            preview_copy: suffixed_stem(document, PREVIEW_SUFFIX),
            extraction_dir,
            fragments,
        }
    }

    /// The archive the operator edits.
    pub fn document(&self) -> &Path {
        &self.document
    }

    /// `<stem>__preview<ext>` next to the document.
    pub fn preview_copy(&self) -> &Path {
        &self.preview_copy
    }

    /// `<name>__extracted/` next to the document.
    pub fn extraction_dir(&self) -> &Path {
        &self.extraction_dir
    }

    /// Whitelisted fragment files inside the extraction dir.
    pub fn fragments(&self) -> &[PathBuf] {
        &self.fragments
    }
}

/// `report.docx` -> `report<suffix>.docx`
fn suffixed_stem(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_stem().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    if let Some(ext) = path.extension() {
        name.push(".");
        name.push(ext);
    }
    path.with_file_name(name)
}

/// `report.docx` -> `report.docx<suffix>`
fn suffixed_name(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}
