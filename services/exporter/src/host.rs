//! Replaying host events from newline-delimited JSON.
//!
//! Each input line stands in for one host callback:
//!
//! ```json
//! {"kind": 3, "payload": {"trap": {"type": "generic", "trap_num": 128, "issuer_lid": 7}}}
//! {"kind": 4}
//! ```

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use smexport_events::{EventKind, Payload, TrapNames};
use smexport_sink::Sink;
use tracing::{info, warn};

use crate::exporter::{log_export_failure, EventExporter};

/// One host callback: an event code plus an optional typed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostEvent {
    pub kind: EventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
}

impl HostEvent {
    pub fn new(kind: EventKind, payload: Option<Payload>) -> Self {
        Self { kind, payload }
    }

    /// Parses one input line.
    pub fn parse(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Counters from one replay run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Events written to the sink.
    pub exported: u64,
    /// Events whose write failed.
    pub failed: u64,
    /// Input lines that were not valid host events.
    pub skipped: u64,
}

/// Feeds every event in `input` to `exporter`, in order.
///
/// Blank lines are ignored and malformed lines are logged and skipped. Only
/// a failure to read `input` itself is returned as an error.
pub fn replay<S, N, R>(
    exporter: &EventExporter<S, N>,
    input: R,
) -> std::io::Result<ReplayStats>
where
    S: Sink,
    N: TrapNames,
    R: BufRead,
{
    let mut stats = ReplayStats::default();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let event = match HostEvent::parse(&line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line = index + 1, error = %e, "skipping malformed host event");
                stats.skipped += 1;
                continue;
            }
        };

        match exporter.try_report(event.kind, event.payload.as_ref()) {
            Ok(()) => stats.exported += 1,
            Err(e) => {
                log_export_failure(event.kind, &e);
                stats.failed += 1;
            }
        }
    }

    info!(
        exported = stats.exported,
        failed = stats.failed,
        skipped = stats.skipped,
        "replay finished"
    );
    Ok(stats)
}
