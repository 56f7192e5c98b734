//! Export configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Knobs for probing, timeline generation and archive writing.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Used when the probed clip yields no dimensions.
    pub fallback_width: u32,
    pub fallback_height: u32,
    /// Used when the probed clip can't be fetched or yields no rate.
    pub fallback_frame_duration: String,
    /// Name of the timeline entry, always first in the archive.
    pub timeline_entry_name: String,
    pub fcpxml_version: String,
    pub event_name: String,
    /// Idle timeout for connecting and for each socket read or write. A
    /// download as a whole has no deadline.
    pub http_timeout_secs: u64,
    /// Write media entries with the `Stored` method. Video doesn't deflate.
    pub store_clips_uncompressed: bool,
    pub logging: LoggingConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            fallback_width: 1280,
            fallback_height: 720,
            fallback_frame_duration: "100/2400s".to_string(),
            timeline_entry_name: "project.fcpxml".to_string(),
            fcpxml_version: "1.9".to_string(),
            event_name: "AI_Generated".to_string(),
            http_timeout_secs: 300,
            store_clips_uncompressed: true,
            logging: LoggingConfig::default(),
        }
    }
}

impl ExportConfig {
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, overridden by `RUST_LOG`.
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
