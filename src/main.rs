//! docx-live-reload - live preview for docx packages.

mod actor;
mod app;
mod cli;
mod config;
mod core;
mod freshness;
mod logger;
mod sync;
mod utils;

use std::sync::Arc;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::Settings;
use crate::core::PathSet;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let document = utils::path::normalize_path(&cli.docx_path);
    let settings = Settings::load(&cli, &document)?;
    if let Some(path) = &settings.config_path {
        debug!("config"; "loaded {}", path.display());
    }

    let paths = Arc::new(PathSet::new(&document, &settings.watch.fragments));
    debug!("preview"; "preview copy: {}", paths.preview_copy().display());
    debug!("sync"; "extraction dir: {}", paths.extraction_dir().display());

    let (tx, rx) = crossbeam::channel::unbounded();
    crate::core::setup_shutdown_handler(tx.clone())?;

    actor::Coordinator::new(paths, settings).run(tx, rx)
}
