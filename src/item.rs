use crate::source::ClipSource;
use serde::{Deserialize, Serialize};

/// One accepted clip queued for export. Batch order is timeline order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportItem {
    /// Archive entry name, already sanitized (see [`crate::naming`]).
    pub name: String,
    pub source: ClipSource,
    pub duration_seconds: u32,
}

impl ExportItem {
    pub fn new(name: impl Into<String>, source: impl Into<ClipSource>, duration_seconds: u32) -> Self {
        Self { name: name.into(), source: source.into(), duration_seconds }
    }

    /// Entry name without its `.mp4` extension, used as the timeline name.
    pub fn clip_name(&self) -> &str {
        self.name.strip_suffix(".mp4").unwrap_or(&self.name)
    }
}
