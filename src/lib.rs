pub mod archive;
pub mod boxes;
pub mod config;
pub mod frame_rate;
pub mod item;
pub mod known_boxes;
pub mod layout;
pub mod logging;
pub mod naming;
pub mod parser;
pub mod probe;
pub mod source;
pub mod timeline;
pub mod walker;

pub use archive::{ExportError, Exporter, assemble};
pub use boxes::{BoxHeader, FourCC, SizeKind};
pub use config::{ExportConfig, LoggingConfig};
pub use frame_rate::resolve;
pub use item::ExportItem;
pub use parser::{ParseError, read_box_header};
pub use probe::{MediaFormat, MediaProber, probe_reader};
pub use source::{ClipFetcher, ClipSource, FetchError, HttpFetcher};
pub use timeline::{TimelineDocument, TimelineError};
pub use walker::{WalkOutcome, WalkReport, walk, walk_stream};
