//! Error types for sinks.

use std::io;

use thiserror::Error;

/// Errors that can occur when opening or writing to a sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The destination could not be opened for append.
    #[error("destination unavailable: {destination}")]
    DestinationUnavailable {
        destination: String,
        #[source]
        source: io::Error,
    },

    /// The destination names a transport this build cannot write to.
    #[error("unsupported destination scheme '{scheme}' in {destination}")]
    UnsupportedScheme { destination: String, scheme: String },

    /// A single record could not be appended or flushed.
    #[error("write failed: {destination}")]
    WriteFailed {
        destination: String,
        #[source]
        source: io::Error,
    },

    /// The record could not be serialized.
    #[error("record encoding failed: {0}")]
    Encode(String),

    /// The sink was already closed.
    #[error("sink closed: {destination}")]
    Closed { destination: String },
}

impl SinkError {
    /// Get the standardized reason code for this error.
    pub fn reason_code(&self) -> &'static str {
        match self {
            SinkError::DestinationUnavailable { .. } => "destination_unavailable",
            SinkError::UnsupportedScheme { .. } => "unsupported_scheme",
            SinkError::WriteFailed { .. } => "write_failed",
            SinkError::Encode(_) => "encode_failed",
            SinkError::Closed { .. } => "sink_closed",
        }
    }

    /// Returns true if this error happened while opening the destination.
    pub fn is_open_error(&self) -> bool {
        matches!(
            self,
            SinkError::DestinationUnavailable { .. } | SinkError::UnsupportedScheme { .. }
        )
    }
}

impl From<serde_json::Error> for SinkError {
    fn from(err: serde_json::Error) -> Self {
        SinkError::Encode(err.to_string())
    }
}
