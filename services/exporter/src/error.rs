//! Error types for the exporter.

use smexport_sink::SinkError;
use thiserror::Error;

/// Exporter errors with standardized reason codes.
#[derive(Debug, Error)]
pub enum ExporterError {
    /// The output destination could not be opened. The exporter is not installed.
    #[error("exporter not installed")]
    DestinationUnavailable(#[source] SinkError),

    /// One record could not be appended. The sink stays open.
    #[error("event not exported")]
    WriteFailed(#[source] SinkError),

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Renders `e` and every error in its source chain, separated by `": "`.
pub fn error_chain(e: &dyn std::error::Error) -> String {
    let mut out = e.to_string();
    let mut source = e.source();
    while let Some(cause) = source {
        out.push_str(": ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

impl ExporterError {
    /// Get the standardized reason code for this error.
    pub fn reason_code(&self) -> &'static str {
        match self {
            ExporterError::DestinationUnavailable(_) => "destination_unavailable",
            ExporterError::WriteFailed(_) => "write_failed",
            ExporterError::InvalidConfig(_) => "invalid_config",
        }
    }
}
