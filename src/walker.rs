//! Streaming walk over the `moov` tree collecting what the prober needs:
//! display dimensions, media timescale and the first sample delta.
//!
//! Nothing is materialized as a tree. Recursion depth equals container
//! nesting depth and each box is visited at most once.

use crate::boxes::FourCC;
use crate::known_boxes::KnownBox;
use crate::layout;
use crate::parser::{ParseError, Result, read_box_header};
use serde::Serialize;
use std::io::{Read, Seek, SeekFrom};
use std::ops::ControlFlow;
use tracing::{debug, trace};

pub const VIDEO_HANDLER: FourCC = FourCC(*b"vide");

/// Media timescale and the duration of one sample in that timescale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RatePair {
    pub timescale: u32,
    pub sample_delta: u32,
}

/// Facts gathered inside one `trak`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrackFacts {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub timescale: Option<u32>,
    pub sample_delta: Option<u32>,
    pub handler: Option<FourCC>,
}

impl TrackFacts {
    /// A track without `hdlr` is given the benefit of the doubt.
    pub fn may_carry_video(&self) -> bool {
        self.handler.is_none_or(|h| h == VIDEO_HANDLER)
    }

    pub fn rate(&self) -> Option<RatePair> {
        match (self.timescale, self.sample_delta) {
            (Some(timescale), Some(sample_delta)) if timescale > 0 && sample_delta > 0 => {
                Some(RatePair { timescale, sample_delta })
            }
            _ => None,
        }
    }
}

/// Whatever subset of the format the walk could determine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WalkOutcome {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub rate: Option<RatePair>,
}

impl WalkOutcome {
    pub fn is_complete(&self) -> bool {
        self.width.is_some() && self.height.is_some() && self.rate.is_some()
    }

    /// First video-capable track with non-zero dimensions sets them; first
    /// one with a usable rate pair sets the rate. Neither is overwritten.
    fn absorb(&mut self, track: &TrackFacts) {
        if !track.may_carry_video() {
            return;
        }
        if self.width.is_none() && self.height.is_none() {
            if let (Some(w), Some(h)) = (track.width, track.height) {
                if w > 0 && h > 0 {
                    self.width = Some(w);
                    self.height = Some(h);
                }
            }
        }
        if self.rate.is_none() {
            self.rate = track.rate();
        }
    }
}

/// Result of a walk. `error` is set when the walk stopped on malformed
/// metadata; `outcome` still carries what was found before that point.
#[derive(Debug)]
pub struct WalkReport {
    pub outcome: WalkOutcome,
    pub error: Option<ParseError>,
}

/// Walk the boxes in `[offset, offset + limit)`.
pub fn walk<R: Read + Seek>(r: &mut R, offset: u64, limit: u64) -> WalkReport {
    let mut walker = Walker { reader: r, outcome: WalkOutcome::default() };
    // collects leaves found outside any `trak`
    let mut loose = TrackFacts::default();
    let result = walker.walk_region(offset, offset.saturating_add(limit), &mut loose);
    walker.outcome.absorb(&loose);
    WalkReport { outcome: walker.outcome, error: result.err() }
}

/// Walk a whole seekable stream, from byte 0 to its end.
pub fn walk_stream<R: Read + Seek>(r: &mut R) -> WalkReport {
    match r.seek(SeekFrom::End(0)) {
        Ok(len) => walk(r, 0, len),
        Err(e) => WalkReport { outcome: WalkOutcome::default(), error: Some(e.into()) },
    }
}

struct Walker<'a, R> {
    reader: &'a mut R,
    outcome: WalkOutcome,
}

impl<R: Read + Seek> Walker<'_, R> {
    fn walk_region(&mut self, start: u64, end: u64, track: &mut TrackFacts) -> Result<ControlFlow<()>> {
        let mut pos = start;
        while pos < end {
            self.reader.seek(SeekFrom::Start(pos))?;
            let hdr = read_box_header(&mut *self.reader, end)?;
            let kind = KnownBox::from(hdr.typ);
            trace!(typ = %hdr.typ, name = kind.full_name(), offset = hdr.start, size = hdr.size, "box");

            match kind {
                KnownBox::Trak => {
                    let mut facts = TrackFacts::default();
                    let walked = self.walk_region(hdr.payload_offset(), hdr.end(), &mut facts);
                    debug!(?facts, "track");
                    self.outcome.absorb(&facts);
                    if walked?.is_break() || self.outcome.is_complete() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
                KnownBox::Moov | KnownBox::Mdia | KnownBox::Minf | KnownBox::Stbl => {
                    if self.walk_region(hdr.payload_offset(), hdr.end(), track)?.is_break() {
                        return Ok(ControlFlow::Break(()));
                    }
                }
                KnownBox::Tkhd => {
                    if track.width.is_none() {
                        let (w, h) = layout::read_tkhd_dimensions(&mut *self.reader, &hdr)?;
                        track.width = Some(w);
                        track.height = Some(h);
                    }
                }
                KnownBox::Mdhd => {
                    track.timescale = Some(layout::read_mdhd_timescale(&mut *self.reader, &hdr)?);
                }
                KnownBox::Hdlr => {
                    track.handler = Some(layout::read_handler_type(&mut *self.reader, &hdr)?);
                }
                KnownBox::Stts => {
                    if track.sample_delta.is_none() {
                        track.sample_delta = layout::read_first_sample_delta(&mut *self.reader, &hdr)?;
                    }
                }
                KnownBox::Other(_) => {}
            }

            pos = hdr.end();
        }
        Ok(ControlFlow::Continue(()))
    }
}
