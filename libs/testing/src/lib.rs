//! Test fixtures shared by the exporter crates.
//!
//! - [`StubTrapNames`]: a trap table tests fill in themselves
//! - [`SharedBuffer`]: an in-memory sink target readable after writes
//! - [`FlakyWriter`]: a target that fails chosen writes
//! - payload and timestamp fixtures, plus the expected key schemas

use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, TimeZone, Utc};
use smexport_events::{NodeGuid, PortErrorPayload, TrapNames};
use smexport_sink::AppendTarget;

// =============================================================================
// Expected Schemas
// =============================================================================

pub const PORT_ERRORS_KEYS: [&str; 18] = [
    "timestamp",
    "event",
    "payload_node_guid",
    "payload_port_num",
    "payload_node_name",
    "payload_symbol_err_cnt",
    "payload_link_err_recover",
    "payload_link_downed",
    "payload_rcv_err",
    "payload_rcv_rem_phys_err",
    "payload_rcv_switch_relay_err",
    "payload_xmit_discards",
    "payload_xmit_constraint_err",
    "payload_rcv_constraint_err",
    "payload_link_integrity",
    "payload_buffer_overrun",
    "payload_vl15_dropped",
    "payload_xmit_wait",
];

pub const TRAP_GENERIC_KEYS: [&str; 5] = [
    "timestamp",
    "event",
    "payload_type",
    "payload_trap_name",
    "payload_issuer_lid",
];

pub const TRAP_VENDOR_KEYS: [&str; 4] = ["timestamp", "event", "payload_type", "payload_issuer_lid"];

pub const BARE_KEYS: [&str; 2] = ["timestamp", "event"];

// =============================================================================
// Fixtures
// =============================================================================

/// 2024-03-01T12:00:00.123456Z
pub fn fixed_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0)
        .unwrap()
        .checked_add_signed(chrono::Duration::microseconds(123_456))
        .unwrap()
}

pub fn sample_port_errors() -> PortErrorPayload {
    PortErrorPayload {
        node_guid: NodeGuid::new(0x0002_c903_00ab_cdef),
        port_num: 17,
        node_name: "spine-02 HCA-1".to_string(),
        symbol_err_cnt: 65_535,
        link_err_recover: 1,
        link_downed: 2,
        rcv_err: 3,
        rcv_rem_phys_err: 4,
        rcv_switch_relay_err: 5,
        xmit_discards: 6,
        xmit_constraint_err: 7,
        rcv_constraint_err: 8,
        link_integrity: 9,
        buffer_overrun: 10,
        vl15_dropped: 11,
        xmit_wait: 1 << 40,
    }
}

/// Parses newline-delimited JSON, panicking on any malformed line.
pub fn parse_lines(output: &str) -> Vec<serde_json::Value> {
    output
        .lines()
        .map(|line| serde_json::from_str(line).expect("line is valid JSON"))
        .collect()
}

/// Returns the keys of a JSON object line in the order they appear in the text.
pub fn keys_in_line(line: &str) -> Vec<String> {
    let value: serde_json::Value = serde_json::from_str(line).expect("line is valid JSON");
    let object = value.as_object().expect("line is a JSON object");
    let mut keys: Vec<(usize, String)> = object
        .keys()
        .map(|k| {
            let pos = line
                .find(&format!("\"{k}\":"))
                .expect("key appears in line");
            (pos, k.clone())
        })
        .collect();
    keys.sort();
    keys.into_iter().map(|(_, k)| k).collect()
}

// =============================================================================
// Trap Names
// =============================================================================

/// Trap table populated by the test.
#[derive(Debug, Clone, Default)]
pub struct StubTrapNames(HashMap<u16, String>);

impl StubTrapNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, trap_num: u16, name: impl Into<String>) -> Self {
        self.0.insert(trap_num, name.into());
        self
    }
}

impl TrapNames for StubTrapNames {
    fn lookup(&self, trap_num: u16) -> Option<&str> {
        self.0.get(&trap_num).map(String::as_str)
    }
}

// =============================================================================
// Writers
// =============================================================================

/// Cloneable in-memory target; every clone sees the same bytes.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> String {
        let bytes = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        String::from_utf8(bytes.clone()).expect("sink output is UTF-8")
    }

    pub fn lines(&self) -> Vec<String> {
        self.contents().lines().map(str::to_string).collect()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl AppendTarget for SharedBuffer {}

/// Writes into a [`SharedBuffer`] but fails while failures are armed.
///
/// Each armed failure rejects one whole `write` call with an I/O error. A
/// tear lets a few bytes through and then fails the following call.
#[derive(Debug, Clone, Default)]
pub struct FlakyWriter {
    buffer: SharedBuffer,
    armed: Arc<AtomicUsize>,
    tear: Arc<Mutex<Option<usize>>>,
}

impl FlakyWriter {
    pub fn new(buffer: SharedBuffer) -> Self {
        Self {
            buffer,
            ..Self::default()
        }
    }

    /// Makes the next `count` writes fail.
    pub fn fail_next(&self, count: usize) {
        self.armed.store(count, Ordering::SeqCst);
    }

    /// Accepts `bytes` more bytes, then fails the next write once.
    pub fn tear_after(&self, bytes: usize) {
        *self.tear.lock().unwrap_or_else(PoisonError::into_inner) = Some(bytes);
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }
}

impl Write for FlakyWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let tripped = self
            .armed
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if tripped {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
        }

        let mut tear = self.tear.lock().unwrap_or_else(PoisonError::into_inner);
        match *tear {
            Some(0) => {
                *tear = None;
                Err(io::Error::new(io::ErrorKind::Other, "injected torn write"))
            }
            Some(budget) => {
                let n = budget.min(buf.len());
                *tear = Some(budget - n);
                self.buffer.write(&buf[..n])
            }
            None => self.buffer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buffer.flush()
    }
}

impl AppendTarget for FlakyWriter {}
