//! Configuration for the exporter.
//!
//! The host hands over a single option string naming the destination. When it
//! is empty the destination falls back to `SMEXPORT_DEFAULT_OUTPUT`, then to
//! [`DEFAULT_OUTPUT_PATH`].

use smexport_sink::SyncPolicy;

use crate::error::ExporterError;

/// Destination used when neither the host nor the environment names one.
pub const DEFAULT_OUTPUT_PATH: &str = "/var/log/opensm-events.log";

/// Overrides [`DEFAULT_OUTPUT_PATH`] without changing the host option contract.
pub const ENV_DEFAULT_OUTPUT: &str = "SMEXPORT_DEFAULT_OUTPUT";

/// Destination option, as the host would pass it.
pub const ENV_OUTPUT: &str = "SMEXPORT_OUTPUT";

/// Sync policy (`flush` or `data`).
pub const ENV_SYNC: &str = "SMEXPORT_SYNC";

/// Exporter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    /// Raw destination string; parsed when the exporter is constructed.
    pub destination: String,

    /// How far each write is pushed before returning.
    pub sync: SyncPolicy,
}

impl ExporterConfig {
    /// Builds the config from the host's option string.
    pub fn from_options(options: Option<&str>) -> Self {
        let env_default = std::env::var(ENV_DEFAULT_OUTPUT).ok();
        Self {
            destination: resolve_destination(options, env_default.as_deref()),
            sync: SyncPolicy::default(),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ExporterError> {
        let options = std::env::var(ENV_OUTPUT).ok();
        let mut config = Self::from_options(options.as_deref());

        if let Ok(raw) = std::env::var(ENV_SYNC) {
            config.sync = raw
                .parse()
                .map_err(|e| ExporterError::InvalidConfig(format!("{ENV_SYNC}: {e}")))?;
        }

        Ok(config)
    }

    /// Replaces the destination when `options` is non-empty.
    pub fn with_options(mut self, options: Option<&str>) -> Self {
        if let Some(dest) = options.filter(|s| !s.is_empty()) {
            self.destination = dest.to_string();
        }
        self
    }

    pub fn with_sync(mut self, sync: SyncPolicy) -> Self {
        self.sync = sync;
        self
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self::from_options(None)
    }
}

/// Picks the destination: a non-empty option string always wins, then a
/// non-empty environment default, then [`DEFAULT_OUTPUT_PATH`].
pub fn resolve_destination(options: Option<&str>, env_default: Option<&str>) -> String {
    options
        .filter(|s| !s.is_empty())
        .or_else(|| env_default.filter(|s| !s.is_empty()))
        .unwrap_or(DEFAULT_OUTPUT_PATH)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_override_default() {
        assert_eq!(
            resolve_destination(Some("/tmp/events.log"), Some("/srv/events.log")),
            "/tmp/events.log"
        );
    }

    #[test]
    fn test_empty_options_use_env_default() {
        assert_eq!(
            resolve_destination(Some(""), Some("/srv/events.log")),
            "/srv/events.log"
        );
        assert_eq!(resolve_destination(None, Some("/srv/events.log")), "/srv/events.log");
    }

    #[test]
    fn test_fixed_default() {
        assert_eq!(resolve_destination(None, None), DEFAULT_OUTPUT_PATH);
        assert_eq!(resolve_destination(Some(""), Some("")), DEFAULT_OUTPUT_PATH);
    }

    /// Environment variables are process-wide, so every `from_env` case runs
    /// in this one test.
    #[test]
    fn test_from_env() {
        std::env::set_var(ENV_OUTPUT, "/tmp/from-env.log");
        std::env::set_var(ENV_SYNC, "data");
        let config = ExporterConfig::from_env().unwrap();
        assert_eq!(config.destination, "/tmp/from-env.log");
        assert_eq!(config.sync, SyncPolicy::Data);

        std::env::set_var(ENV_SYNC, "sometimes");
        let err = ExporterConfig::from_env().unwrap_err();
        assert_eq!(err.reason_code(), "invalid_config");
        assert!(err.to_string().contains("SMEXPORT_SYNC"));

        std::env::remove_var(ENV_SYNC);
        std::env::remove_var(ENV_OUTPUT);
        std::env::set_var(ENV_DEFAULT_OUTPUT, "/srv/default.log");
        let config = ExporterConfig::from_env().unwrap();
        assert_eq!(config.destination, "/srv/default.log");
        assert_eq!(config.sync, SyncPolicy::Flush);
        std::env::remove_var(ENV_DEFAULT_OUTPUT);
    }

    #[test]
    fn test_with_options_ignores_empty() {
        let config = ExporterConfig {
            destination: "/a".to_string(),
            sync: SyncPolicy::Flush,
        };
        assert_eq!(config.clone().with_options(Some("")).destination, "/a");
        assert_eq!(config.with_options(Some("/b")).destination, "/b");
    }
}
