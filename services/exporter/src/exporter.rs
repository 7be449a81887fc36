//! The exporter instance the host installs.
//!
//! Lifecycle:
//! 1. `construct` opens the destination; failure means "not installed"
//! 2. `report` is called once per event, possibly from several threads
//! 3. `destroy` (or drop) closes the sink

use chrono::{DateTime, Utc};
use smexport_events::{EventKind, Payload, RecordEncoder, StandardTrapNames, TrapNames};
use smexport_sink::{DestinationSink, Sink};
use tracing::{debug, error, info, warn};

use crate::config::ExporterConfig;
use crate::error::{error_chain, ExporterError};

/// Encodes host events and appends them to one sink.
pub struct EventExporter<S: Sink = DestinationSink, N: TrapNames = StandardTrapNames> {
    encoder: RecordEncoder<N>,
    sink: S,
}

impl EventExporter<DestinationSink, StandardTrapNames> {
    /// Opens the configured destination with the standard trap table.
    pub fn construct(config: &ExporterConfig) -> Result<Self, ExporterError> {
        Self::construct_with_trap_names(config, StandardTrapNames)
    }
}

impl<N: TrapNames> EventExporter<DestinationSink, N> {
    /// Opens the configured destination with a caller-supplied trap table.
    pub fn construct_with_trap_names(
        config: &ExporterConfig,
        names: N,
    ) -> Result<Self, ExporterError> {
        let sink = match smexport_sink::open(&config.destination, config.sync) {
            Ok(sink) => sink,
            Err(e) => {
                error!(
                    destination = %config.destination,
                    reason = e.reason_code(),
                    error = %error_chain(&e),
                    "failed to open event output"
                );
                return Err(ExporterError::DestinationUnavailable(e));
            }
        };

        info!(
            destination = %config.destination,
            sync = ?config.sync,
            "exporting events"
        );
        Ok(Self::with_sink(sink, names))
    }
}

impl<S: Sink, N: TrapNames> EventExporter<S, N> {
    /// Builds an exporter over an already-open sink.
    pub fn with_sink(sink: S, names: N) -> Self {
        Self {
            encoder: RecordEncoder::with_trap_names(names),
            sink,
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Encodes and writes one event captured at `captured_at`.
    pub fn export(
        &self,
        kind: EventKind,
        payload: Option<&Payload>,
        captured_at: DateTime<Utc>,
    ) -> Result<(), ExporterError> {
        if let EventKind::Unknown(code) = kind {
            debug!(code, "unrecognized event kind");
        }
        let record = self.encoder.encode(kind, payload, captured_at);
        self.sink.write(&record).map_err(ExporterError::WriteFailed)?;
        debug!(
            event = record.kind_name(),
            fields = record.fields().len(),
            "event exported"
        );
        Ok(())
    }

    /// Exports an event stamped with the current time.
    pub fn try_report(
        &self,
        kind: EventKind,
        payload: Option<&Payload>,
    ) -> Result<(), ExporterError> {
        self.export(kind, payload, Utc::now())
    }

    /// Host entry point: exports an event identified by its raw code.
    ///
    /// Never fails. Write failures are logged and the next event is attempted
    /// normally.
    pub fn report(&self, code: u32, payload: Option<&Payload>) {
        let kind = EventKind::from_code(code);
        if let Err(e) = self.try_report(kind, payload) {
            log_export_failure(kind, &e);
        }
    }

    /// Host entry point: closes the sink and drops the exporter.
    pub fn destroy(self) {
        drop(self);
    }
}

impl<S: Sink, N: TrapNames> Drop for EventExporter<S, N> {
    fn drop(&mut self) {
        self.sink.close();
    }
}

impl<S: Sink + std::fmt::Debug, N: TrapNames> std::fmt::Debug for EventExporter<S, N> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventExporter")
            .field("sink", &self.sink)
            .finish_non_exhaustive()
    }
}

pub(crate) fn log_export_failure(kind: EventKind, e: &ExporterError) {
    warn!(
        event = kind.name(),
        code = kind.code(),
        reason = e.reason_code(),
        error = %error_chain(e),
        "failed to export event"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use smexport_events::TrapPayload;
    use smexport_sink::{LineSink, SyncPolicy};
    use smexport_testing::SharedBuffer;
    use std::sync::Arc;

    fn memory_exporter() -> (EventExporter<LineSink<SharedBuffer>>, SharedBuffer) {
        let buffer = SharedBuffer::new();
        let exporter = EventExporter::with_sink(
            LineSink::new("memory", buffer.clone(), SyncPolicy::Flush),
            StandardTrapNames,
        );
        (exporter, buffer)
    }

    #[test]
    fn test_export_writes_one_line() {
        let (exporter, buffer) = memory_exporter();
        let payload = Payload::Trap(TrapPayload::generic(128, 3));
        exporter
            .export(
                EventKind::Trap,
                Some(&payload),
                Utc.timestamp_opt(0, 0).unwrap(),
            )
            .unwrap();

        assert_eq!(
            buffer.lines(),
            vec![concat!(
                r#"{"timestamp":"1970-01-01T00:00:00.000000Z","event":"TRAP","#,
                r#""payload_type":"generic","payload_trap_name":"Link state change","#,
                r#""payload_issuer_lid":3}"#
            )]
        );
    }

    #[test]
    fn test_report_after_close_does_not_panic() {
        let (exporter, buffer) = memory_exporter();
        exporter.sink().close();
        exporter.report(4, None);
        exporter.report(1234, None);
        assert!(buffer.lines().is_empty());
    }

    #[test]
    fn test_destroy_closes_sink() {
        let sink = Arc::new(LineSink::new("memory", SharedBuffer::new(), SyncPolicy::Flush));
        let exporter = EventExporter::with_sink(sink.clone(), StandardTrapNames);
        exporter.report(4, None);
        exporter.destroy();
        assert!(sink.is_closed());
    }
}
