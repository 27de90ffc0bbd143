//! `[watch]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! interval_ms = 100                                     # Poll period for both watchers
//! fragments = ["word/document.xml", "word/styles.xml"]  # Parts exposed for editing
//! ```

use std::path::{Component, Path};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Change detection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct WatchConfig {
    /// Poll period in milliseconds.
    pub interval_ms: u64,

    /// Archive parts that are pretty-printed on extract and watched for edits,
    /// relative to the extraction directory.
    pub fragments: Vec<String>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_ms: 100,
            fragments: vec!["word/document.xml".into(), "word/styles.xml".into()],
        }
    }
}

impl WatchConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.interval_ms == 0 {
            return Err(ConfigError::Validation(
                "watch.interval_ms must be greater than 0".into(),
            ));
        }
        if self.fragments.is_empty() {
            return Err(ConfigError::Validation(
                "watch.fragments must name at least one part".into(),
            ));
        }
        for fragment in &self.fragments {
            if !is_contained(Path::new(fragment)) {
                return Err(ConfigError::Validation(format!(
                    "watch.fragments entry `{fragment}` must be a relative path inside the package"
                )));
            }
        }
        Ok(())
    }
}

/// Relative, non-empty, and never climbing out with `..`.
fn is_contained(path: &Path) -> bool {
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
