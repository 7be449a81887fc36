//! # smexport-exporter
//!
//! The subnet manager event exporter: one instance per installation, binding
//! a record encoder to an append-only sink.
//!
//! The host drives three entry points on [`EventExporter`]:
//! - `construct`: open the configured destination, or fail and stay uninstalled
//! - `report`: encode one event and append it, logging (never returning) failures
//! - `destroy`: close the destination
//!
//! The `event-exporter` binary replays host events from JSON lines through the
//! same entry points.

pub mod config;
pub mod error;
pub mod exporter;
pub mod host;
pub mod logging;

pub use config::ExporterConfig;
pub use error::ExporterError;
pub use exporter::EventExporter;
pub use host::{replay, HostEvent, ReplayStats};
