//! Docx fixtures shared by sync and preview tests.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use zip::{ZipArchive, ZipWriter, write::SimpleFileOptions};

use super::SyncEngine;
use crate::core::PathSet;
use crate::freshness::ChangeWatcher;

pub const FRAGMENTS: [&str; 2] = ["word/document.xml", "word/styles.xml"];

/// A small but complete package.
pub fn sample_entries() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="urn:ct"><Default Extension="xml" ContentType="application/xml"/></Types>"#,
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="urn:rels"><Relationship Id="rId1" Target="word/document.xml"/></Relationships>"#,
        ),
        (
            "word/document.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="urn:w"><w:body><w:p><w:r><w:t>Hello</w:t></w:r></w:p></w:body></w:document>"#,
        ),
        (
            "word/styles.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="urn:w"><w:style w:styleId="Normal"/></w:styles>"#,
        ),
        ("word/media/image1.png", "\u{89}PNG not really"),
    ]
}

pub fn write_docx(path: &Path, entries: &[(&str, &str)]) {
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    for (name, content) in entries {
        zip.start_file(*name, SimpleFileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

pub fn read_docx(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut zip = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut entries = BTreeMap::new();
    for index in 0..zip.len() {
        let mut entry = zip.by_index(index).unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        entries.insert(entry.name().to_string(), content);
    }
    entries
}

/// Force a file's mtime so change detection never depends on clock resolution.
pub fn set_mtime(path: &Path, secs: u64) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

/// Document at `<dir>/doc.docx` plus an engine and its fragment watcher.
pub fn engine_for(
    dir: &Path,
    entries: &[(&str, &str)],
) -> (SyncEngine, Arc<PathSet>, Arc<ChangeWatcher>) {
    let document: PathBuf = dir.join("doc.docx");
    write_docx(&document, entries);

    let paths = Arc::new(PathSet::new(&document, &FRAGMENTS));
    let fragments = Arc::new(ChangeWatcher::new(
        "fragments",
        paths.fragments().to_vec(),
    ));
    let engine = SyncEngine::new(Arc::clone(&paths), Arc::clone(&fragments));
    (engine, paths, fragments)
}
