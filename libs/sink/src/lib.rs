//! # smexport-sink
//!
//! Append-only destinations for exported event records.
//!
//! A sink owns one output stream and exposes three operations:
//! - open: [`Destination::open`] or [`open`], failing loudly if the
//!   destination cannot be opened for append
//! - write: [`Sink::write`], one newline-terminated JSON line per record,
//!   flushed before returning
//! - close: [`Sink::close`], idempotent
//!
//! Writes are serialized through an internal mutex, so records from
//! concurrent callers never interleave mid-line. A failed write is reported to
//! the caller and leaves the sink open.

mod destination;
mod error;
mod line;

pub use destination::{open, Destination, DestinationSink, Output};
pub use error::SinkError;
pub use line::{AppendTarget, LineSink, Sink, SyncPolicy};
