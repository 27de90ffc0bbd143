//! `[preview]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [preview]
//! command = ["libreoffice", "--norestore", "--view"]  # Viewer, document path is appended
//! heartbeat_ms = 500                                 # Liveness check period
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Viewer application settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PreviewConfig {
    /// Program and leading arguments used to open the preview copy.
    pub command: Vec<String>,

    /// How long the preview loop waits for a command before checking
    /// that the viewer is still running.
    pub heartbeat_ms: u64,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            command: vec!["libreoffice".into(), "--norestore".into(), "--view".into()],
            heartbeat_ms: 500,
        }
    }
}

impl PreviewConfig {
    pub fn heartbeat(&self) -> Duration {
        Duration::from_millis(self.heartbeat_ms)
    }

    pub fn program(&self) -> Option<&str> {
        self.command.first().map(String::as_str)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.heartbeat_ms == 0 {
            return Err(ConfigError::Validation(
                "preview.heartbeat_ms must be greater than 0".into(),
            ));
        }
        let Some(program) = self.program().filter(|p| !p.trim().is_empty()) else {
            return Err(ConfigError::Validation(
                "preview.command must name a program".into(),
            ));
        };
        if which::which(program).is_err() && !Path::new(program).is_file() {
            return Err(ConfigError::Validation(format!(
                "preview.command program `{program}` not found in PATH"
            )));
        }
        Ok(())
    }
}
