//! Logging initialization for the exporter binary.
//!
//! Diagnostics always go to stderr. Library code only emits `tracing` events;
//! installing a subscriber is left to the binary.

use std::io;

use clap::ValueEnum;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format for the exporter's own logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable single-line output.
    #[default]
    Compact,
    /// One JSON object per log event.
    Json,
}

/// Builds the filter, preferring `RUST_LOG` over `default_level`.
fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize logging to stderr.
pub fn init(format: LogFormat, default_level: &str) -> anyhow::Result<()> {
    let registry = tracing_subscriber::registry().with(filter(default_level));

    match format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .try_init()?,
        LogFormat::Compact => registry
            .with(tracing_subscriber::fmt::layer().compact().with_writer(io::stderr))
            .try_init()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_values() {
        assert_eq!(LogFormat::from_str("json", true).unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("compact", true).unwrap(), LogFormat::Compact);
        assert!(LogFormat::from_str("pretty", true).is_err());
    }

    #[test]
    fn test_second_init_is_an_error() {
        // Whichever test initializes first wins; the second attempt must not panic.
        let _ = init(LogFormat::Compact, "warn");
        assert!(init(LogFormat::Json, "warn").is_err());
    }
}
