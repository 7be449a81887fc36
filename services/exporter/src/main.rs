//! event-exporter - replays subnet manager events into the export log.
//!
//! Reads one host event per line (JSON) from a file or stdin and reports each
//! through an [`EventExporter`], exactly as the host would:
//! - construct once from the destination option
//! - report every event, logging write failures and continuing
//! - destroy at end of input

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use smexport_exporter::logging::{self, LogFormat};
use smexport_exporter::{replay, EventExporter, ExporterConfig, ReplayStats};
use smexport_sink::SyncPolicy;
use tracing::{error, info};

/// Export subnet manager events as JSON lines.
#[derive(Debug, Parser)]
#[command(name = "event-exporter")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Output destination: a path, file://<path>, or - for stderr.
    ///
    /// Falls back to SMEXPORT_OUTPUT, then SMEXPORT_DEFAULT_OUTPUT, then
    /// /var/log/opensm-events.log.
    #[arg(short, long)]
    output: Option<String>,

    /// Read host events from this file instead of stdin.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Sync file data to stable storage after every record.
    #[arg(long)]
    sync: bool,

    /// Format of the exporter's own diagnostics.
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    log_format: LogFormat,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, env = "SMEXPORT_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_format, &cli.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "event-exporter starting");

    match run(&cli) {
        Ok(stats) => {
            info!(
                exported = stats.exported,
                failed = stats.failed,
                skipped = stats.skipped,
                "event-exporter exiting"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "event-exporter failed");
            let mut source = e.source();
            while let Some(cause) = source {
                error!(cause = %cause, "caused by");
                source = cause.source();
            }
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> Result<ReplayStats> {
    let mut config = ExporterConfig::from_env()?.with_options(cli.output.as_deref());
    if cli.sync {
        config = config.with_sync(SyncPolicy::Data);
    }

    let exporter = EventExporter::construct(&config)
        .with_context(|| format!("exporter not installed for {}", config.destination))?;

    let stats = match &cli.input {
        Some(path) => {
            let file =
                File::open(path).with_context(|| format!("open input {}", path.display()))?;
            replay(&exporter, BufReader::new(file))
        }
        None => replay(&exporter, io::stdin().lock()),
    }
    .context("read host events")?;

    exporter.destroy();
    Ok(stats)
}
