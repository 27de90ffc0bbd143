//! Archive -> extraction directory.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use zip::ZipArchive;

use super::error::{FragmentError, SyncError, io_at, zip_at};
use crate::{debug, log, utils::xml};

/// Unzip every entry of `archive` into `dir`, overwriting existing files.
///
/// Returns the number of files written.
pub(super) fn unzip_into(archive: &Path, dir: &Path) -> Result<usize, SyncError> {
    let file = File::open(archive).map_err(io_at(archive))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(zip_at(archive))?;
    fs::create_dir_all(dir).map_err(io_at(dir))?;

    let mut written = 0;
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).map_err(zip_at(archive))?;
        let Some(relative) = entry.enclosed_name() else {
            log!("warning"; "skipping unsafe entry name `{}`", entry.name());
            continue;
        };
        let out = dir.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out).map_err(io_at(&out))?;
            continue;
        }
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent).map_err(io_at(parent))?;
        }
        let mut target = File::create(&out).map_err(io_at(&out))?;
        io::copy(&mut entry, &mut target).map_err(io_at(&out))?;
        written += 1;
    }
    Ok(written)
}

/// Pretty-print each fragment in place. Fragments the archive lacks are skipped.
///
/// Returns the number of fragments rewritten.
pub(super) fn normalize_fragments(fragments: &[PathBuf]) -> Result<usize, SyncError> {
    let mut rewritten = 0;
    for path in fragments {
        let Some(bytes) = read_fragment(path)? else {
            debug!("sync"; "{} not in package, skipping", path.display());
            continue;
        };
        let pretty = xml::pretty(&bytes).map_err(|source| FragmentError {
            path: path.clone(),
            source,
        })?;
        fs::write(path, pretty).map_err(io_at(path))?;
        rewritten += 1;
    }
    Ok(rewritten)
}

/// Read a fragment, `None` if it does not exist.
pub(super) fn read_fragment(path: &Path) -> Result<Option<Vec<u8>>, SyncError> {
    match fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_at(path)(err)),
    }
}
