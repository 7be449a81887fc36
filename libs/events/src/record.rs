//! The canonical output unit: one timestamped record per delivered event.

use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::kind::EventKind;
use crate::types::NodeGuid;

/// Timestamp layout: UTC, zero-padded, exactly six fractional digits.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

/// Prefix applied to every payload field name on output.
pub const PAYLOAD_KEY_PREFIX: &str = "payload_";

/// Formats a capture instant as `YYYY-MM-DDTHH:MM:SS.ffffffZ`.
///
/// The output does not depend on the process locale or time zone.
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

// =============================================================================
// Field Values
// =============================================================================

/// A scalar payload value.
///
/// Counters, port numbers and LIDs are emitted as JSON unsigned integers.
/// GUIDs are emitted as hex strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Unsigned(u64),
    Guid(NodeGuid),
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Text(s) => serializer.serialize_str(s),
            FieldValue::Unsigned(n) => serializer.serialize_u64(*n),
            FieldValue::Guid(g) => serializer.collect_str(g),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        FieldValue::Unsigned(n)
    }
}

impl From<u16> for FieldValue {
    fn from(n: u16) -> Self {
        FieldValue::Unsigned(n.into())
    }
}

impl From<u8> for FieldValue {
    fn from(n: u8) -> Self {
        FieldValue::Unsigned(n.into())
    }
}

impl From<NodeGuid> for FieldValue {
    fn from(g: NodeGuid) -> Self {
        FieldValue::Guid(g)
    }
}

// =============================================================================
// Fields
// =============================================================================

/// Insertion-ordered mapping of payload field names to values.
///
/// Names are stored without the `payload_` prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(&'static str, FieldValue)>);

impl Fields {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Inserts a field. Re-inserting an existing name replaces its value in place.
    pub fn insert(&mut self, name: &'static str, value: impl Into<FieldValue>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.iter().find(|(k, _)| *k == name).map(|(_, v)| v)
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(k, _)| *k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &FieldValue)> {
        self.0.iter().map(|(k, v)| (*k, v))
    }
}

// =============================================================================
// Event Record
// =============================================================================

/// One exported event.
///
/// Serializes as a flat JSON object: `timestamp`, `event`, then each payload
/// field as `payload_<name>` in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    timestamp: DateTime<Utc>,
    kind: EventKind,
    fields: Fields,
}

impl EventRecord {
    pub fn new(timestamp: DateTime<Utc>, kind: EventKind, fields: Fields) -> Self {
        Self {
            timestamp,
            kind,
            fields,
        }
    }

    /// The kind's record name (`"UNKNOWN"` for unrecognized codes).
    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    /// Serializes the record as one newline-terminated JSON line.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl Serialize for EventRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2 + self.fields.len()))?;
        map.serialize_entry("timestamp", &format_timestamp(&self.timestamp))?;
        map.serialize_entry("event", self.kind.name())?;
        for (name, value) in self.fields.iter() {
            map.serialize_entry(&format!("{PAYLOAD_KEY_PREFIX}{name}"), value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64, micros: u32) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, micros * 1_000).unwrap()
    }

    #[test]
    fn test_timestamp_format() {
        assert_eq!(format_timestamp(&at(0, 0)), "1970-01-01T00:00:00.000000Z");
        assert_eq!(
            format_timestamp(&at(1_700_000_000, 42)),
            "2023-11-14T22:13:20.000042Z"
        );
    }

    #[test]
    fn test_timestamp_truncates_to_micros() {
        let ts = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        assert_eq!(format_timestamp(&ts), "2023-11-14T22:13:20.123456Z");
    }

    #[test]
    fn test_fields_keep_insertion_order() {
        let mut fields = Fields::new();
        fields.insert("b", 2u64);
        fields.insert("a", "x");
        fields.insert("b", 3u64);

        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["b", "a"]);
        assert_eq!(fields.get("b"), Some(&FieldValue::Unsigned(3)));
        assert!(!fields.contains_key("c"));
    }

    #[test]
    fn test_record_json_line() {
        let mut fields = Fields::new();
        fields.insert("node_guid", NodeGuid::new(1));
        fields.insert("node_name", "sw\"1");
        fields.insert("port_num", 3u8);
        let record = EventRecord::new(at(0, 5), EventKind::PortErrors, fields);

        assert_eq!(
            record.to_json_line().unwrap(),
            concat!(
                r#"{"timestamp":"1970-01-01T00:00:00.000005Z","event":"PORT_ERRORS","#,
                r#""payload_node_guid":"0x0000000000000001","payload_node_name":"sw\"1","#,
                r#""payload_port_num":3}"#,
                "\n"
            )
        );
    }

    #[test]
    fn test_empty_record_has_no_payload_keys() {
        let record = EventRecord::new(at(0, 0), EventKind::SubnetUp, Fields::new());
        assert_eq!(
            serde_json::to_string(&record).unwrap(),
            r#"{"timestamp":"1970-01-01T00:00:00.000000Z","event":"SUBNET_UP"}"#
        );
    }
}
