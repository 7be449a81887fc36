//! Typed payloads handed over by the host alongside an event kind.
//!
//! The exporter never interprets the magnitudes carried here. Counters are
//! snapshot values copied through as-is.

use serde::{Deserialize, Serialize};

// =============================================================================
// Identifiers
// =============================================================================

/// 64-bit opaque node identifier.
///
/// Always rendered as `0x` followed by sixteen lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct NodeGuid(u64);

impl NodeGuid {
    /// Creates a GUID from its host-order value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl From<u64> for NodeGuid {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for NodeGuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

impl std::str::FromStr for NodeGuid {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        u64::from_str_radix(digits, 16).map(Self)
    }
}

impl Serialize for NodeGuid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NodeGuid {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(NodeGuid(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

// =============================================================================
// Event Payloads
// =============================================================================

// -----------------------------------------------------------------------------
// Port Errors
// -----------------------------------------------------------------------------

/// Error counter snapshot for one port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortErrorPayload {
    pub node_guid: NodeGuid,
    pub port_num: u8,
    /// Node description; the host may not know it yet.
    #[serde(default)]
    pub node_name: String,
    #[serde(default)]
    pub symbol_err_cnt: u64,
    #[serde(default)]
    pub link_err_recover: u64,
    #[serde(default)]
    pub link_downed: u64,
    #[serde(default)]
    pub rcv_err: u64,
    #[serde(default)]
    pub rcv_rem_phys_err: u64,
    #[serde(default)]
    pub rcv_switch_relay_err: u64,
    #[serde(default)]
    pub xmit_discards: u64,
    #[serde(default)]
    pub xmit_constraint_err: u64,
    #[serde(default)]
    pub rcv_constraint_err: u64,
    #[serde(default)]
    pub link_integrity: u64,
    #[serde(default)]
    pub buffer_overrun: u64,
    #[serde(default)]
    pub vl15_dropped: u64,
    #[serde(default)]
    pub xmit_wait: u64,
}

// -----------------------------------------------------------------------------
// Traps
// -----------------------------------------------------------------------------

/// Notice discriminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NoticeType {
    /// A standard trap identified by its trap number.
    Generic { trap_num: u16 },
    /// A vendor-specific trap. No name is ever resolved for these.
    Vendor,
}

impl NoticeType {
    /// Discriminator as rendered in records.
    pub fn as_str(&self) -> &'static str {
        match self {
            NoticeType::Generic { .. } => "generic",
            NoticeType::Vendor => "vendor",
        }
    }
}

/// A trap notice received by the subnet manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapPayload {
    #[serde(flatten)]
    pub notice: NoticeType,
    /// LID of the port that issued the trap.
    pub issuer_lid: u16,
}

impl TrapPayload {
    pub fn generic(trap_num: u16, issuer_lid: u16) -> Self {
        Self {
            notice: NoticeType::Generic { trap_num },
            issuer_lid,
        }
    }

    pub fn vendor(issuer_lid: u16) -> Self {
        Self {
            notice: NoticeType::Vendor,
            issuer_lid,
        }
    }
}

// -----------------------------------------------------------------------------
// Payload union
// -----------------------------------------------------------------------------

/// Every payload variant the exporter knows how to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Payload {
    PortErrors(PortErrorPayload),
    Trap(TrapPayload),
}

impl From<PortErrorPayload> for Payload {
    fn from(p: PortErrorPayload) -> Self {
        Payload::PortErrors(p)
    }
}

impl From<TrapPayload> for Payload {
    fn from(p: TrapPayload) -> Self {
        Payload::Trap(p)
    }
}

// =============================================================================
// Tests
// =============================================================================
