//! Media format detection for an export batch.
//!
//! Only one clip is probed per batch and its format is applied to every
//! clip in the timeline. Callers are expected to hand over batches whose
//! clips share resolution and frame rate.

use crate::config::ExportConfig;
use crate::frame_rate;
use crate::item::ExportItem;
use crate::source::{ClipFetcher, ClipSource, FetchError};
use crate::walker::{WalkOutcome, walk_stream};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, Read, Seek};
use tracing::{debug, warn};

/// Resolution and frame duration shared by every clip of a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFormat {
    pub width: u32,
    pub height: u32,
    /// Rational seconds, e.g. `"100/2400s"`.
    pub frame_duration: String,
}

impl MediaFormat {
    pub fn fallback(config: &ExportConfig) -> Self {
        Self {
            width: config.fallback_width,
            height: config.fallback_height,
            frame_duration: config.fallback_frame_duration.clone(),
        }
    }

    /// Take what the walk found and fill the gaps from `config`.
    pub fn from_outcome(outcome: &WalkOutcome, config: &ExportConfig) -> Self {
        Self {
            width: outcome.width.unwrap_or(config.fallback_width),
            height: outcome.height.unwrap_or(config.fallback_height),
            frame_duration: outcome
                .rate
                .map(|r| frame_rate::resolve(r.timescale, r.sample_delta))
                .unwrap_or_else(|| config.fallback_frame_duration.clone()),
        }
    }

    pub fn display_name(&self) -> String {
        format!("FFVideoFormat{}p", self.height)
    }
}

/// A clip's full content spooled to an anonymous temporary file.
///
/// `moov` may sit after `mdat`, so probing needs random access. The file
/// has no name on disk and is gone once this value is dropped.
#[derive(Debug)]
pub struct SpooledClip {
    file: File,
    len: u64,
}

impl SpooledClip {
    pub fn fetch<F: ClipFetcher + ?Sized>(fetcher: &F, source: &ClipSource) -> Result<Self, FetchError> {
        let mut reader = fetcher.open(source)?;
        let mut file = tempfile::tempfile()?;
        let len = io::copy(&mut reader, &mut file)?;
        file.rewind()?;
        Ok(Self { file, len })
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Hand over the spool file positioned at its start.
    pub fn into_reader(mut self) -> io::Result<File> {
        self.file.rewind()?;
        Ok(self.file)
    }
}

pub struct MediaProber<'a, F: ?Sized> {
    fetcher: &'a F,
    config: &'a ExportConfig,
}

impl<'a, F: ClipFetcher + ?Sized> MediaProber<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a ExportConfig) -> Self {
        Self { fetcher, config }
    }

    /// Never fails: unreachable or unparsable clips yield the fallback format.
    pub fn probe(&self, clip: &ExportItem) -> MediaFormat {
        self.probe_spooled(clip).0
    }

    /// Like [`probe`](Self::probe), but also returns the spooled bytes when
    /// the fetch succeeded so they can be written out without a second fetch.
    pub fn probe_spooled(&self, clip: &ExportItem) -> (MediaFormat, Option<SpooledClip>) {
        let mut spooled = match SpooledClip::fetch(self.fetcher, &clip.source) {
            Ok(spooled) => spooled,
            Err(error) => {
                warn!(clip = %clip.name, %error, "could not fetch clip for probing, using fallback format");
                return (MediaFormat::fallback(self.config), None);
            }
        };
        if spooled.is_empty() {
            warn!(clip = %clip.name, "fetched clip is empty, using fallback format");
            return (MediaFormat::fallback(self.config), Some(spooled));
        }
        debug!(clip = %clip.name, bytes = spooled.len(), "spooled clip for probing");
        let format = probe_reader(&mut spooled.file, self.config);
        (format, Some(spooled))
    }
}

/// Probe an already seekable source.
pub fn probe_reader<R: Read + Seek>(r: &mut R, config: &ExportConfig) -> MediaFormat {
    let report = walk_stream(r);
    if let Some(error) = &report.error {
        warn!(%error, outcome = ?report.outcome, "box walk stopped on malformed metadata");
    }
    if report.outcome.rate.is_none() {
        warn!(fallback = %config.fallback_frame_duration, "no frame rate found");
    }
    let format = MediaFormat::from_outcome(&report.outcome, config);
    debug!(?format, "probed media format");
    format
}
