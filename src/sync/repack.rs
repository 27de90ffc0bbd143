//! Extraction directory -> archive.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use zip::{CompressionMethod, ZipWriter, write::SimpleFileOptions};

use super::error::{SyncError, io_at, zip_at};
use crate::utils::path::entry_name;

/// Every file under `dir`, in sorted traversal order.
pub(super) fn collect_files(dir: &Path) -> Result<Vec<PathBuf>, SyncError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).sort(true).skip_hidden(false) {
        let entry = entry.map_err(|source| SyncError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() {
            files.push(entry.path());
        }
    }
    Ok(files)
}

/// Rewrite `archive` from scratch with the contents of `dir`.
///
/// The new package is written next to the archive and renamed over it, so
/// readers never observe a truncated file. Returns the number of entries.
pub(super) fn write_archive(archive: &Path, dir: &Path) -> Result<usize, SyncError> {
    let files = collect_files(dir)?;
    let parent = archive.parent().unwrap_or_else(|| Path::new("."));

    let staged = tempfile::Builder::new()
        .prefix(".repack-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(io_at(parent))?;
    if let Ok(meta) = fs::metadata(archive) {
        staged
            .as_file()
            .set_permissions(meta.permissions())
            .map_err(io_at(staged.path()))?;
    }

    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(BufWriter::new(staged.as_file()));
    let mut entries = 0;

    for path in &files {
        let Some(name) = entry_name(dir, path) else {
            continue;
        };
        writer.start_file(name, options).map_err(zip_at(archive))?;
        let mut source = File::open(path).map_err(io_at(path))?;
        io::copy(&mut source, &mut writer).map_err(io_at(path))?;
        entries += 1;
    }

    let mut buffered = writer.finish().map_err(zip_at(archive))?;
    buffered.flush().map_err(io_at(staged.path()))?;
    drop(buffered);

    staged
        .persist(archive)
        .map_err(|err| io_at(archive)(err.error))?;
    Ok(entries)
}
