//! # smexport-events
//!
//! Event kinds, payloads and the record encoder for the subnet manager event
//! exporter.
//!
//! ## Design Principles
//!
//! - Encoding is pure and total: it never fails and never panics
//! - Unrecognized event kinds become `UNKNOWN` records
//! - Records are ephemeral and carry no cross-record state
//! - Field order per payload variant is fixed
//!
//! ## Record Layout
//!
//! Each record serializes to one JSON object:
//! - `timestamp`: capture instant, `YYYY-MM-DDTHH:MM:SS.ffffffZ`
//! - `event`: the kind name (`PORT_ERRORS`, `TRAP`, ...)
//! - `payload_*`: flattened payload fields, present only for kinds with a
//!   typed payload
//!
//! ## Payload Variants
//!
//! - Port errors: node GUID, port, node name and fourteen error counters
//! - Traps: notice type, trap name (generic only) and issuer LID

mod encoder;
mod kind;
mod record;
mod trap_names;
mod types;

pub use encoder::*;
pub use kind::*;
pub use record::*;
pub use trap_names::*;
pub use types::*;
