//! Event kind taxonomy delivered by the subnet manager.

use serde::{Deserialize, Serialize};

// =============================================================================
// Event Kind Names
// =============================================================================

/// All event kind names as they appear in the `event` field of a record.
pub mod event_names {
    pub const PORT_ERRORS: &str = "PORT_ERRORS";
    pub const PORT_DATA_COUNTERS: &str = "PORT_DATA_COUNTERS";
    pub const PORT_SELECT: &str = "PORT_SELECT";
    pub const TRAP: &str = "TRAP";
    pub const SUBNET_UP: &str = "SUBNET_UP";
    pub const HEAVY_SWEEP_START: &str = "HEAVY_SWEEP_START";
    pub const HEAVY_SWEEP_DONE: &str = "HEAVY_SWEEP_DONE";
    pub const UCAST_ROUTING_DONE: &str = "UCAST_ROUTING_DONE";
    pub const STATE_CHANGE: &str = "STATE_CHANGE";
    pub const SA_DB_DUMPED: &str = "SA_DB_DUMPED";
    pub const LFT_CHANGE: &str = "LFT_CHANGE";
    pub const UNKNOWN: &str = "UNKNOWN";
}

/// Category of a host-delivered notification.
///
/// The host identifies kinds by a numeric code. Codes outside the known range
/// map to [`EventKind::Unknown`], which keeps the raw code so it can still be
/// logged. New kinds on the host side never break the exporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PortErrors,
    PortDataCounters,
    PortSelect,
    Trap,
    SubnetUp,
    HeavySweepStart,
    HeavySweepDone,
    UcastRoutingDone,
    StateChange,
    SaDbDumped,
    LftChange,
    /// A code this exporter does not know about.
    Unknown(u32),
}

impl EventKind {
    /// Every recognized kind, in host code order.
    pub const KNOWN: [EventKind; 11] = [
        EventKind::PortErrors,
        EventKind::PortDataCounters,
        EventKind::PortSelect,
        EventKind::Trap,
        EventKind::SubnetUp,
        EventKind::HeavySweepStart,
        EventKind::HeavySweepDone,
        EventKind::UcastRoutingDone,
        EventKind::StateChange,
        EventKind::SaDbDumped,
        EventKind::LftChange,
    ];

    /// Maps a host event code to a kind. Never fails.
    #[must_use]
    pub const fn from_code(code: u32) -> Self {
        match code {
            0 => EventKind::PortErrors,
            1 => EventKind::PortDataCounters,
            2 => EventKind::PortSelect,
            3 => EventKind::Trap,
            4 => EventKind::SubnetUp,
            5 => EventKind::HeavySweepStart,
            6 => EventKind::HeavySweepDone,
            7 => EventKind::UcastRoutingDone,
            8 => EventKind::StateChange,
            9 => EventKind::SaDbDumped,
            10 => EventKind::LftChange,
            other => EventKind::Unknown(other),
        }
    }

    /// Returns the host event code for this kind.
    #[must_use]
    pub const fn code(&self) -> u32 {
        match self {
            EventKind::PortErrors => 0,
            EventKind::PortDataCounters => 1,
            EventKind::PortSelect => 2,
            EventKind::Trap => 3,
            EventKind::SubnetUp => 4,
            EventKind::HeavySweepStart => 5,
            EventKind::HeavySweepDone => 6,
            EventKind::UcastRoutingDone => 7,
            EventKind::StateChange => 8,
            EventKind::SaDbDumped => 9,
            EventKind::LftChange => 10,
            EventKind::Unknown(code) => *code,
        }
    }

    /// Returns the record name for this kind.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            EventKind::PortErrors => event_names::PORT_ERRORS,
            EventKind::PortDataCounters => event_names::PORT_DATA_COUNTERS,
            EventKind::PortSelect => event_names::PORT_SELECT,
            EventKind::Trap => event_names::TRAP,
            EventKind::SubnetUp => event_names::SUBNET_UP,
            EventKind::HeavySweepStart => event_names::HEAVY_SWEEP_START,
            EventKind::HeavySweepDone => event_names::HEAVY_SWEEP_DONE,
            EventKind::UcastRoutingDone => event_names::UCAST_ROUTING_DONE,
            EventKind::StateChange => event_names::STATE_CHANGE,
            EventKind::SaDbDumped => event_names::SA_DB_DUMPED,
            EventKind::LftChange => event_names::LFT_CHANGE,
            EventKind::Unknown(_) => event_names::UNKNOWN,
        }
    }

    /// Returns true if the host code was not recognized.
    pub fn is_unknown(&self) -> bool {
        matches!(self, EventKind::Unknown(_))
    }
}

impl From<u32> for EventKind {
    fn from(code: u32) -> Self {
        EventKind::from_code(code)
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

// Kinds cross the host boundary as bare codes.
impl Serialize for EventKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.code())
    }
}

impl<'de> Deserialize<'de> for EventKind {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        u32::deserialize(deserializer).map(EventKind::from_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_known_codes_roundtrip() {
        for (code, kind) in EventKind::KNOWN.iter().enumerate() {
            assert_eq!(kind.code(), code as u32);
            assert_eq!(EventKind::from_code(code as u32), *kind);
            assert!(!kind.is_unknown());
        }
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(EventKind::SubnetUp.to_string(), "SUBNET_UP");
        assert_eq!(EventKind::Unknown(77).to_string(), "UNKNOWN");
    }

    #[test]
    fn test_kind_deserializes_from_code() {
        let kind: EventKind = serde_json::from_str("3").unwrap();
        assert_eq!(kind, EventKind::Trap);

        let kind: EventKind = serde_json::from_str("4000").unwrap();
        assert_eq!(kind, EventKind::Unknown(4000));
    }

    proptest! {
        #[test]
        fn unrecognized_codes_are_unknown(code in 11u32..) {
            let kind = EventKind::from_code(code);
            prop_assert_eq!(kind, EventKind::Unknown(code));
            prop_assert_eq!(kind.name(), "UNKNOWN");
            prop_assert_eq!(kind.code(), code);
        }
    }
}
