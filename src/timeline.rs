//! FCPXML timeline document.
//!
//! Layout:
//!
//! ```text
//! fcpxml[version]
//! ├── resources
//! │   ├── format   (id r0)
//! │   └── asset*   (ids r1..rN, one per clip)
//! └── library/event/project/sequence/spine
//!     └── clip*    (one per asset, back to back)
//! ```

use crate::config::ExportConfig;
use crate::item::ExportItem;
use crate::probe::MediaFormat;
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

pub const FORMAT_ID: &str = "r0";

#[derive(Debug, thiserror::Error)]
pub enum TimelineError {
    #[error("xml: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Asset {
    pub id: String,
    pub name: String,
    /// Path relative to the timeline file inside the archive.
    pub src: String,
    pub duration_seconds: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpineClip {
    pub name: String,
    pub asset_ref: String,
    pub offset_seconds: u64,
    pub duration_seconds: u32,
}

/// Everything that goes into the document, computed up front.
///
/// `spine[k].offset_seconds` is the sum of the durations of `spine[..k]`,
/// and `spine[k].asset_ref == assets[k].id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineDocument {
    pub version: String,
    pub event_name: String,
    pub project_name: String,
    pub format: MediaFormat,
    pub assets: Vec<Asset>,
    pub spine: Vec<SpineClip>,
}

fn resource_id(index: usize) -> String {
    format!("r{index}")
}

fn seconds(n: impl std::fmt::Display) -> String {
    format!("{n}s")
}

impl TimelineDocument {
    pub fn new(project_name: &str, format: &MediaFormat, clips: &[ExportItem], config: &ExportConfig) -> Self {
        let mut assets = Vec::with_capacity(clips.len());
        let mut spine = Vec::with_capacity(clips.len());
        let mut offset: u64 = 0;

        for (i, clip) in clips.iter().enumerate() {
            let id = resource_id(i + 1);
            assets.push(Asset {
                id: id.clone(),
                name: clip.clip_name().to_string(),
                src: format!("./{}", clip.name),
                duration_seconds: clip.duration_seconds,
            });
            spine.push(SpineClip {
                name: clip.clip_name().to_string(),
                asset_ref: id,
                offset_seconds: offset,
                duration_seconds: clip.duration_seconds,
            });
            offset += u64::from(clip.duration_seconds);
        }

        Self {
            version: config.fcpxml_version.clone(),
            event_name: config.event_name.clone(),
            project_name: project_name.to_string(),
            format: format.clone(),
            assets,
            spine,
        }
    }

    pub fn total_duration_seconds(&self) -> u64 {
        self.spine
            .last()
            .map(|c| c.offset_seconds + u64::from(c.duration_seconds))
            .unwrap_or(0)
    }

    pub fn to_xml(&self) -> Result<Vec<u8>, TimelineError> {
        let mut w = Writer::new_with_indent(Vec::new(), b' ', 4);

        w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        w.write_event(Event::DocType(BytesText::from_escaped("fcpxml")))?;
        w.write_event(Event::Start(
            BytesStart::new("fcpxml").with_attributes([("version", self.version.as_str())]),
        ))?;

        w.write_event(Event::Start(BytesStart::new("resources")))?;
        let (width, height) = (self.format.width.to_string(), self.format.height.to_string());
        let format_name = self.format.display_name();
        w.write_event(Event::Empty(BytesStart::new("format").with_attributes([
            ("id", FORMAT_ID),
            ("name", format_name.as_str()),
            ("frameDuration", self.format.frame_duration.as_str()),
            ("width", width.as_str()),
            ("height", height.as_str()),
        ])))?;
        for asset in &self.assets {
            let duration = seconds(asset.duration_seconds);
            w.write_event(Event::Empty(BytesStart::new("asset").with_attributes([
                ("id", asset.id.as_str()),
                ("name", asset.name.as_str()),
                ("src", asset.src.as_str()),
                ("start", "0s"),
                ("duration", duration.as_str()),
                ("hasVideo", "1"),
                ("hasAudio", "1"),
                ("format", FORMAT_ID),
            ])))?;
        }
        w.write_event(Event::End(BytesEnd::new("resources")))?;

        w.write_event(Event::Start(BytesStart::new("library")))?;
        w.write_event(Event::Start(
            BytesStart::new("event").with_attributes([("name", self.event_name.as_str())]),
        ))?;
        w.write_event(Event::Start(
            BytesStart::new("project").with_attributes([("name", self.project_name.as_str())]),
        ))?;
        w.write_event(Event::Start(BytesStart::new("sequence").with_attributes([("format", FORMAT_ID)])))?;
        w.write_event(Event::Start(BytesStart::new("spine")))?;
        for clip in &self.spine {
            let (offset, duration) = (seconds(clip.offset_seconds), seconds(clip.duration_seconds));
            w.write_event(Event::Empty(BytesStart::new("clip").with_attributes([
                ("name", clip.name.as_str()),
                ("offset", offset.as_str()),
                ("duration", duration.as_str()),
                ("start", "0s"),
                ("ref", clip.asset_ref.as_str()),
            ])))?;
        }
        for tag in ["spine", "sequence", "project", "event", "library", "fcpxml"] {
            w.write_event(Event::End(BytesEnd::new(tag)))?;
        }

        let mut out = w.into_inner();
        out.push(b'\n');
        Ok(out)
    }
}

/// Build the serialized document in one go.
pub fn build(
    project_name: &str,
    format: &MediaFormat,
    clips: &[ExportItem],
    config: &ExportConfig,
) -> Result<Vec<u8>, TimelineError> {
    TimelineDocument::new(project_name, format, clips, config).to_xml()
}
