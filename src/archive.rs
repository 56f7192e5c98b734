//! ZIP export: the timeline document first, then every clip in order.

use crate::config::ExportConfig;
use crate::item::ExportItem;
use crate::probe::{MediaFormat, MediaProber};
use crate::source::{ClipFetcher, ClipSource, FetchError, HttpFetcher};
use crate::timeline::{TimelineDocument, TimelineError};
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info, warn};
use zip::CompressionMethod;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("no exportable content")]
    NoExportableContent,
    #[error("failed to build timeline document: {0}")]
    DocumentBuild(#[from] TimelineError),
    #[error("failed to add clip {name} from {origin}: {cause}")]
    ClipFetch {
        name: String,
        origin: ClipSource,
        #[source]
        cause: FetchError,
    },
    #[error("archive: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// Probes, builds the timeline and writes the archive.
pub struct Exporter<F = HttpFetcher> {
    fetcher: F,
    config: ExportConfig,
}

impl Exporter<HttpFetcher> {
    pub fn new(config: ExportConfig) -> Self {
        let fetcher = HttpFetcher::new(config.http_timeout());
        Self { fetcher, config }
    }
}

impl<F: ClipFetcher> Exporter<F> {
    pub fn with_fetcher(config: ExportConfig, fetcher: F) -> Self {
        Self { fetcher, config }
    }

    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn prober(&self) -> MediaProber<'_, F> {
        MediaProber::new(&self.fetcher, &self.config)
    }

    /// Write `1 + clips.len()` entries to `sink` and return it.
    ///
    /// The first clip's format is used for the whole timeline. Nothing is
    /// written when `clips` is empty or the timeline can't be built. A clip
    /// that can't be fetched aborts the export, leaving the entries already
    /// written in `sink`.
    pub fn assemble<W: Write + Seek>(
        &self,
        sink: W,
        project_name: &str,
        clips: &[ExportItem],
    ) -> Result<W, ExportError> {
        let Some(first) = clips.first() else {
            return Err(ExportError::NoExportableContent);
        };
        info!(project = project_name, clips = clips.len(), "exporting");

        let (format, spooled) = self.prober().probe_spooled(first);
        let document = TimelineDocument::new(project_name, &format, clips, &self.config);
        info!(total_seconds = document.total_duration_seconds(), format = ?document.format, "timeline ready");
        let xml = document.to_xml()?;

        let mut zip = ZipWriter::new(sink);
        zip.start_file(self.config.timeline_entry_name.as_str(), self.timeline_options())?;
        zip.write_all(&xml)?;
        debug!(entry = %self.config.timeline_entry_name, bytes = xml.len(), "wrote timeline");

        // the spool, if any, holds clips[0] and is consumed on the first pass
        let mut spooled = spooled;
        for clip in clips {
            let reader: Box<dyn Read> = match spooled.take() {
                Some(spool) => Box::new(spool.into_reader()?),
                None => self.fetcher.open(&clip.source).map_err(|e| clip_fetch(clip, e))?,
            };
            self.write_clip(&mut zip, clip, reader)?;
        }

        let sink = zip.finish()?;
        info!(project = project_name, "export finished");
        Ok(sink)
    }

    /// Assemble into a new file at `path`. On failure the file is removed,
    /// so an incomplete archive never stays behind under the final name.
    pub fn assemble_to_file(
        &self,
        path: &Path,
        project_name: &str,
        clips: &[ExportItem],
    ) -> Result<(), ExportError> {
        if clips.is_empty() {
            return Err(ExportError::NoExportableContent);
        }
        let file = File::create(path)?;
        let written = self
            .assemble(BufWriter::new(file), project_name, clips)
            .and_then(|mut sink| Ok(sink.flush()?));
        if written.is_err() {
            if let Err(error) = fs::remove_file(path) {
                warn!(path = %path.display(), %error, "could not remove incomplete archive");
            }
        }
        written
    }

    /// Probe a batch's first clip without writing anything.
    pub fn probe_batch(&self, clips: &[ExportItem]) -> Result<MediaFormat, ExportError> {
        clips
            .first()
            .map(|clip| self.prober().probe(clip))
            .ok_or(ExportError::NoExportableContent)
    }

    fn write_clip<W: Write + Seek>(
        &self,
        zip: &mut ZipWriter<W>,
        clip: &ExportItem,
        reader: Box<dyn Read>,
    ) -> Result<(), ExportError> {
        zip.start_file(clip.name.as_str(), self.clip_options())?;
        let mut source = SourceRead { inner: reader, failure: None };
        match io::copy(&mut source, zip) {
            Ok(bytes) => {
                debug!(entry = %clip.name, bytes, "wrote clip");
                Ok(())
            }
            // only a failed read is the clip's fault; anything else came from the sink
            Err(e) => match source.failure.take() {
                Some(cause) => Err(clip_fetch(clip, cause.into())),
                None => Err(e.into()),
            },
        }
    }

    fn timeline_options(&self) -> SimpleFileOptions {
        SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
    }

    fn clip_options(&self) -> SimpleFileOptions {
        let method = if self.config.store_clips_uncompressed {
            CompressionMethod::Stored
        } else {
            CompressionMethod::Deflated
        };
        SimpleFileOptions::default().compression_method(method)
    }
}

/// Keeps the error of a failed read so it can be told apart from a write
/// error once `io::copy` returns.
struct SourceRead<R> {
    inner: R,
    failure: Option<io::Error>,
}

impl<R: Read> Read for SourceRead<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.inner.read(buf) {
            Err(e) if e.kind() != io::ErrorKind::Interrupted => {
                let kind = e.kind();
                self.failure = Some(e);
                Err(kind.into())
            }
            other => other,
        }
    }
}

fn clip_fetch(clip: &ExportItem, cause: FetchError) -> ExportError {
    ExportError::ClipFetch { name: clip.name.clone(), origin: clip.source.clone(), cause }
}

/// [`Exporter::assemble`] with the default configuration and fetcher.
pub fn assemble<W: Write + Seek>(sink: W, project_name: &str, clips: &[ExportItem]) -> Result<W, ExportError> {
    Exporter::new(ExportConfig::default()).assemble(sink, project_name, clips)
}

