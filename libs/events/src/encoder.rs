//! Mapping from a host event to its canonical record.
//!
//! Encoding is total. Unrecognized kinds produce an `UNKNOWN` record and a
//! payload that is absent or does not belong to the kind produces a record
//! with no payload fields.

use chrono::{DateTime, Utc};

use crate::kind::EventKind;
use crate::record::{EventRecord, Fields};
use crate::trap_names::{trap_name_or_placeholder, StandardTrapNames, TrapNames};
use crate::types::{NoticeType, Payload, PortErrorPayload, TrapPayload};

/// A payload that knows how to flatten itself into record fields.
pub trait RenderFields {
    /// Appends this payload's fields, in their fixed order, to `fields`.
    fn render(&self, fields: &mut Fields, names: &dyn TrapNames);
}

impl RenderFields for PortErrorPayload {
    fn render(&self, fields: &mut Fields, _names: &dyn TrapNames) {
        fields.insert("node_guid", self.node_guid);
        fields.insert("port_num", self.port_num);
        fields.insert("node_name", self.node_name.as_str());
        fields.insert("symbol_err_cnt", self.symbol_err_cnt);
        fields.insert("link_err_recover", self.link_err_recover);
        fields.insert("link_downed", self.link_downed);
        fields.insert("rcv_err", self.rcv_err);
        fields.insert("rcv_rem_phys_err", self.rcv_rem_phys_err);
        fields.insert("rcv_switch_relay_err", self.rcv_switch_relay_err);
        fields.insert("xmit_discards", self.xmit_discards);
        fields.insert("xmit_constraint_err", self.xmit_constraint_err);
        fields.insert("rcv_constraint_err", self.rcv_constraint_err);
        fields.insert("link_integrity", self.link_integrity);
        fields.insert("buffer_overrun", self.buffer_overrun);
        fields.insert("vl15_dropped", self.vl15_dropped);
        fields.insert("xmit_wait", self.xmit_wait);
    }
}

impl RenderFields for TrapPayload {
    fn render(&self, fields: &mut Fields, names: &dyn TrapNames) {
        fields.insert("type", self.notice.as_str());
        // Consumers branch on the presence of this key, so vendor traps omit it.
        if let NoticeType::Generic { trap_num } = self.notice {
            fields.insert("trap_name", trap_name_or_placeholder(names, trap_num));
        }
        fields.insert("issuer_lid", self.issuer_lid);
    }
}

/// Builds [`EventRecord`]s, resolving trap names through `N`.
#[derive(Debug, Clone, Default)]
pub struct RecordEncoder<N = StandardTrapNames> {
    names: N,
}

impl RecordEncoder<StandardTrapNames> {
    /// Creates an encoder backed by the standard trap table.
    pub fn new() -> Self {
        Self {
            names: StandardTrapNames,
        }
    }
}

impl<N: TrapNames> RecordEncoder<N> {
    /// Creates an encoder with a caller-supplied trap table.
    pub fn with_trap_names(names: N) -> Self {
        Self { names }
    }

    /// Encodes one event captured at `captured_at`.
    pub fn encode(
        &self,
        kind: EventKind,
        payload: Option<&Payload>,
        captured_at: DateTime<Utc>,
    ) -> EventRecord {
        let mut fields = Fields::new();
        let rendered: Option<&dyn RenderFields> = match (kind, payload) {
            (EventKind::PortErrors, Some(Payload::PortErrors(p))) => Some(p),
            (EventKind::Trap, Some(Payload::Trap(p))) => Some(p),
            _ => None,
        };
        if let Some(payload) = rendered {
            payload.render(&mut fields, &self.names);
        }
        EventRecord::new(captured_at, kind, fields)
    }

    /// Encodes an event identified by its raw host code.
    pub fn encode_code(
        &self,
        code: u32,
        payload: Option<&Payload>,
        captured_at: DateTime<Utc>,
    ) -> EventRecord {
        self.encode(EventKind::from_code(code), payload, captured_at)
    }
}

/// Encodes with the standard trap table.
pub fn encode(
    kind: EventKind,
    payload: Option<&Payload>,
    captured_at: DateTime<Utc>,
) -> EventRecord {
    RecordEncoder::new().encode(kind, payload, captured_at)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;
    use crate::types::NodeGuid;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use std::collections::HashMap;

    struct StubNames(HashMap<u16, String>);

    impl TrapNames for StubNames {
        fn lookup(&self, trap_num: u16) -> Option<&str> {
            self.0.get(&trap_num).map(String::as_str)
        }
    }

    fn stub_encoder() -> RecordEncoder<StubNames> {
        let mut table = HashMap::new();
        table.insert(128, "link state changed".to_string());
        RecordEncoder::with_trap_names(StubNames(table))
    }

    fn ts() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 5_000).unwrap()
    }

    fn port_errors() -> PortErrorPayload {
        PortErrorPayload {
            node_guid: NodeGuid::new(0x0002_c903_0000_0001),
            port_num: 12,
            node_name: "leaf-01".to_string(),
            symbol_err_cnt: 1,
            link_err_recover: 2,
            link_downed: 3,
            rcv_err: 4,
            rcv_rem_phys_err: 5,
            rcv_switch_relay_err: 6,
            xmit_discards: 7,
            xmit_constraint_err: 8,
            rcv_constraint_err: 9,
            link_integrity: 10,
            buffer_overrun: 11,
            vl15_dropped: 12,
            xmit_wait: u64::MAX,
        }
    }

    #[test]
    fn test_port_errors_field_order() {
        let payload = Payload::PortErrors(port_errors());
        let record = stub_encoder().encode(EventKind::PortErrors, Some(&payload), ts());

        let keys: Vec<_> = record.fields().keys().collect();
        assert_eq!(
            keys,
            vec![
                "node_guid",
                "port_num",
                "node_name",
                "symbol_err_cnt",
                "link_err_recover",
                "link_downed",
                "rcv_err",
                "rcv_rem_phys_err",
                "rcv_switch_relay_err",
                "xmit_discards",
                "xmit_constraint_err",
                "rcv_constraint_err",
                "link_integrity",
                "buffer_overrun",
                "vl15_dropped",
                "xmit_wait",
            ]
        );
        assert_eq!(
            record.fields().get("xmit_wait"),
            Some(&FieldValue::Unsigned(u64::MAX))
        );
    }

    #[test]
    fn test_generic_trap_includes_name() {
        let payload = Payload::Trap(TrapPayload::generic(128, 9));
        let record = stub_encoder().encode(EventKind::Trap, Some(&payload), ts());

        assert_eq!(
            record.fields().keys().collect::<Vec<_>>(),
            vec!["type", "trap_name", "issuer_lid"]
        );
        assert_eq!(
            record.fields().get("trap_name"),
            Some(&FieldValue::Text("link state changed".to_string()))
        );
    }

    #[test]
    fn test_unresolved_trap_uses_placeholder() {
        let payload = Payload::Trap(TrapPayload::generic(4242, 9));
        let record = stub_encoder().encode(EventKind::Trap, Some(&payload), ts());
        assert_eq!(
            record.fields().get("trap_name"),
            Some(&FieldValue::Text("UNKNOWN_TRAP".to_string()))
        );
    }

    #[test]
    fn test_vendor_trap_omits_name() {
        let payload = Payload::Trap(TrapPayload::vendor(9));
        let record = stub_encoder().encode(EventKind::Trap, Some(&payload), ts());

        assert_eq!(
            record.fields().keys().collect::<Vec<_>>(),
            vec!["type", "issuer_lid"]
        );
        assert!(!record.fields().contains_key("trap_name"));
    }

    #[test]
    fn test_missing_payload_degrades_to_empty_fields() {
        let record = encode(EventKind::PortErrors, None, ts());
        assert_eq!(record.kind_name(), "PORT_ERRORS");
        assert!(record.fields().is_empty());
    }

    #[test]
    fn test_mismatched_payload_degrades_to_empty_fields() {
        let payload = Payload::Trap(TrapPayload::vendor(1));
        let record = encode(EventKind::PortErrors, Some(&payload), ts());
        assert!(record.fields().is_empty());

        let record = encode(EventKind::SubnetUp, Some(&payload), ts());
        assert!(record.fields().is_empty());
    }

    #[test]
    fn test_unknown_code_encodes_as_unknown() {
        let payload = Payload::PortErrors(port_errors());
        let record = RecordEncoder::new().encode_code(99, Some(&payload), ts());
        assert_eq!(record.kind_name(), "UNKNOWN");
        assert!(record.fields().is_empty());
    }

    proptest! {
        #[test]
        fn encoding_is_deterministic(
            code in 0u32..16,
            trap_num in any::<u16>(),
            lid in any::<u16>(),
            generic in any::<bool>(),
            micros in 0u32..1_000_000,
        ) {
            let at = Utc.timestamp_opt(1_600_000_000, micros * 1_000).unwrap();
            let trap = if generic {
                TrapPayload::generic(trap_num, lid)
            } else {
                TrapPayload::vendor(lid)
            };
            let payload = Payload::Trap(trap);
            let first = encode(EventKind::from_code(code), Some(&payload), at)
                .to_json_line()
                .unwrap();
            let second = encode(EventKind::from_code(code), Some(&payload), at)
                .to_json_line()
                .unwrap();
            prop_assert_eq!(first, second);
        }
    }
}
