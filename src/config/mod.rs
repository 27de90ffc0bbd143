//! Settings for `docx-live-reload.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── preview    # [preview]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError
//! └── mod.rs         # Settings (this file)
//! ```
//!
//! The file is optional. Lookup order: `--config`, then
//! `docx-live-reload.toml` beside the document, then built-in defaults.

mod error;
pub mod section;

pub use error::ConfigError;
pub use section::{PreviewConfig, WatchConfig};

use crate::{cli::Cli, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Default config file name, looked up next to the document.
pub const CONFIG_FILE_NAME: &str = "docx-live-reload.toml";

/// Root configuration structure representing docx-live-reload.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Absolute path of the loaded config file, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Change detection settings
    #[serde(default)]
    pub watch: WatchConfig,

    /// Viewer application settings
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl Settings {
    /// Load settings for `document`, applying CLI overrides and validating.
    pub fn load(cli: &Cli, document: &Path) -> Result<Self> {
        let mut settings = match Self::resolve_config_path(cli, document)? {
            Some(path) => {
                let mut settings = Self::from_path(&path)?;
                settings.config_path = Some(path);
                settings
            }
            None => Self::default(),
        };

        settings.apply_cli(cli);
        settings.validate()?;
        Ok(settings)
    }

    /// Explicit `--config` must exist; the sibling file is optional.
    fn resolve_config_path(cli: &Cli, document: &Path) -> Result<Option<PathBuf>> {
        if let Some(path) = &cli.config {
            if !path.is_file() {
                anyhow::bail!("Config file '{}' not found", path.display());
            }
            return Ok(Some(crate::utils::path::normalize_path(path)));
        }

        let sibling = document
            .parent()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .filter(|path| path.is_file());
        Ok(sibling)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(interval) = cli.interval {
            self.watch.interval_ms = interval;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.watch.validate()?;
        self.preview.validate()
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (settings, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(settings)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let settings = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((settings, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }
}

/// Parse a config snippet for section tests, rejecting unknown fields.
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Settings {
    let (parsed, ignored) = Settings::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn viewer_in(dir: &Path) -> String {
        let viewer = dir.join("viewer");
        fs::write(&viewer, b"").unwrap();
        viewer.to_string_lossy().into_owned()
    }

    fn cli_for(document: &Path, extra: &[&str]) -> Cli {
        let mut args = vec!["docx-live-reload".to_string(), document.display().to_string()];
        args.extend(extra.iter().map(|s| s.to_string()));
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (settings, ignored) =
            Settings::parse_with_ignored("[watch]\ninterval_ms = 50\nspeed = 3\n[extra]\nx = 1")
                .unwrap();
        assert_eq!(settings.watch.interval_ms, 50);
        assert_eq!(ignored.len(), 2);
        assert!(ignored.iter().any(|p| p == "watch.speed"));
        assert!(ignored.iter().any(|p| p == "extra"));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Settings::parse_with_ignored("[watch\ninterval_ms ="),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_load_sibling_config_with_cli_override() {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("doc.docx");
        fs::write(&document, b"PK").unwrap();
        let viewer = viewer_in(dir.path());
        fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            format!("[watch]\ninterval_ms = 300\n[preview]\ncommand = [{viewer:?}]\n"),
        )
        .unwrap();

        let cli = cli_for(&document, &["--interval", "40"]);
        let settings = Settings::load(&cli, &document).unwrap();

        assert_eq!(settings.watch.interval_ms, 40);
        assert_eq!(settings.preview.program(), Some(viewer.as_str()));
        assert!(settings.config_path.is_some());
    }

    #[test]
    fn test_load_missing_explicit_config() {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("doc.docx");
        fs::write(&document, b"PK").unwrap();
        let missing = dir.path().join("nope.toml");

        let cli = cli_for(&document, &["-C", missing.to_str().unwrap()]);
        let err = Settings::load(&cli, &document).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_load_rejects_zero_interval_override() {
        let dir = TempDir::new().unwrap();
        let document = dir.path().join("doc.docx");
        fs::write(&document, b"PK").unwrap();
        let viewer = viewer_in(dir.path());
        let config = dir.path().join("custom.toml");
        fs::write(&config, format!("[preview]\ncommand = [{viewer:?}]\n")).unwrap();

        let cli = cli_for(&document, &["-C", config.to_str().unwrap(), "--interval", "0"]);
        let err = Settings::load(&cli, &document).unwrap_err();
        assert!(err.to_string().contains("interval_ms"));
    }
}
