//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::{Path, PathBuf};

/// Extension a document package must carry.
pub const DOCUMENT_EXTENSION: &str = "docx";

/// Preview a docx file in a word processor. Modify the docx file or the
/// extracted document.xml / styles.xml and the preview reloads with the changes.
#[derive(Parser, Debug, Clone)]
#[command(name = "docx-live-reload", version, about, long_about = None)]
pub struct Cli {
    /// Document to preview
    #[arg(value_name = "DOCX_PATH", value_parser = parse_document_path, value_hint = clap::ValueHint::FilePath)]
    pub docx_path: PathBuf,

    /// Config file path (default: docx-live-reload.toml next to the document)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Poll interval in milliseconds (overrides `watch.interval_ms`)
    #[arg(long, value_name = "MS")]
    pub interval: Option<u64>,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Accept only existing paths with the docx extension.
fn parse_document_path(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    check_document_path(&path)?;
    Ok(path)
}

fn check_document_path(path: &Path) -> Result<(), String> {
    let is_docx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(DOCUMENT_EXTENSION));
    if !is_docx {
        return Err("File must be of the Docx format".to_string());
    }
    if !path.is_file() {
        return Err("File does not exist".to_string());
    }
    Ok(())
}
