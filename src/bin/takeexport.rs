use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use takeexport::{
    ClipSource, ExportConfig, ExportItem, Exporter, MediaFormat, WalkOutcome,
    logging::init_logging,
    naming::{archive_file_name, sanitize},
    probe::SpooledClip,
    timeline, walk_stream,
};

#[derive(Parser, Debug)]
#[command(version, about = "Export accepted takes as an FCPXML timeline + media ZIP")]
struct Args {
    /// JSON export config; missing keys keep their defaults
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log as JSON lines on stderr
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the media format detected for one clip
    Probe {
        /// URL or local path
        source: String,

        /// Also print what the box walk found before fallbacks
        #[arg(long, action = ArgAction::SetTrue)]
        walk: bool,
    },
    /// Print the timeline document for a manifest
    Timeline {
        #[arg(long)]
        project: String,
        /// JSON array of {name, source, duration_seconds}
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Write the export archive for a manifest
    Export {
        #[arg(long)]
        project: String,
        #[arg(long)]
        manifest: PathBuf,
        /// Defaults to `<sanitized project>_export.zip`
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Print the sanitized form of each argument
    Sanitize { text: Vec<String> },
}

#[derive(Serialize)]
struct ProbeReport {
    format: MediaFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    walk: Option<WalkOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    walk_error: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ExportConfig::from_json_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => ExportConfig::default(),
    };
    if args.json_logs {
        config.logging.json = true;
    }
    init_logging(&config.logging);

    let exporter = Exporter::new(config);
    match args.command {
        Command::Probe { source, walk } => probe(&exporter, &source, walk),
        Command::Timeline { project, manifest } => {
            let clips = read_manifest(&manifest)?;
            let format = exporter.probe_batch(&clips)?;
            let xml = timeline::build(&project, &format, &clips, exporter.config())?;
            std::io::stdout().write_all(&xml)?;
            Ok(())
        }
        Command::Export { project, manifest, output } => {
            let clips = read_manifest(&manifest)?;
            let output = output.unwrap_or_else(|| PathBuf::from(archive_file_name(&project)));
            exporter
                .assemble_to_file(&output, &project, &clips)
                .with_context(|| format!("exporting {project} to {}", output.display()))?;
            println!("{}", output.display());
            Ok(())
        }
        Command::Sanitize { text } => {
            for t in text {
                println!("{}", sanitize(&t));
            }
            Ok(())
        }
    }
}

fn probe(exporter: &Exporter, source: &str, show_walk: bool) -> anyhow::Result<()> {
    let item = ExportItem::new("probe", ClipSource::parse(source), 0);

    let report = if show_walk {
        let mut file = SpooledClip::fetch(exporter.fetcher(), &item.source)
            .with_context(|| format!("fetching {source}"))?
            .into_reader()?;
        let walked = walk_stream(&mut file);
        ProbeReport {
            format: MediaFormat::from_outcome(&walked.outcome, exporter.config()),
            walk: Some(walked.outcome),
            walk_error: walked.error.map(|e| e.to_string()),
        }
    } else {
        ProbeReport { format: exporter.prober().probe(&item), walk: None, walk_error: None }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn read_manifest(path: &Path) -> anyhow::Result<Vec<ExportItem>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading manifest {}", path.display()))?;
    let clips: Vec<ExportItem> = serde_json::from_str(&text).context("parsing manifest")?;
    Ok(clips)
}
