//! Row types returned by the message stores.

use chrono::{NaiveDateTime, Timelike};
use serde::Serialize;

/// A stored message as exposed by the listing endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageRecord {
    pub id: i64,
    pub text: String,
    pub time: String,
}

impl MessageRecord {
    pub fn new(id: i64, content: String, created_at: NaiveDateTime) -> Self {
        Self {
            id,
            text: content,
            time: iso_timestamp(&created_at),
        }
    }
}

/// A table or view visible in the store's default schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// The newest message by timestamp, or a pair of nulls for an empty table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LastMessage {
    pub content: Option<String>,
    pub time: Option<String>,
}

impl LastMessage {
    pub fn new(content: String, created_at: NaiveDateTime) -> Self {
        Self {
            content: Some(content),
            time: Some(iso_timestamp(&created_at)),
        }
    }
}

/// Render a naive timestamp as ISO-8601.
///
/// Fractional seconds are printed with microsecond precision, and omitted
/// entirely when zero.
pub fn iso_timestamp(ts: &NaiveDateTime) -> String {
    if ts.nanosecond() == 0 {
        ts.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        ts.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32, micro: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_micro_opt(h, m, s, micro)
            .unwrap()
    }

    #[test]
    fn whole_seconds_have_no_fraction() {
        assert_eq!(iso_timestamp(&at(7, 5, 3, 0)), "2024-03-09T07:05:03");
    }

    #[test]
    fn fraction_is_six_digits() {
        assert_eq!(iso_timestamp(&at(23, 59, 59, 120)), "2024-03-09T23:59:59.000120");
        assert_eq!(iso_timestamp(&at(0, 0, 0, 500_000)), "2024-03-09T00:00:00.500000");
    }

    #[test]
    fn message_record_serializes_to_wire_shape() {
        let record = MessageRecord::new(4, "hi".to_string(), at(1, 2, 3, 0));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 4, "text": "hi", "time": "2024-03-09T01:02:03"})
        );
    }

    #[test]
    fn table_kind_serializes_as_type() {
        let table = TableInfo {
            name: "messages".to_string(),
            kind: "BASE TABLE".to_string(),
        };
        let json = serde_json::to_value(&table).unwrap();
        assert_eq!(json, serde_json::json!({"name": "messages", "type": "BASE TABLE"}));
    }

    #[test]
    fn empty_last_message_is_null_pair() {
        let json = serde_json::to_value(LastMessage::default()).unwrap();
        assert_eq!(json, serde_json::json!({"content": null, "time": null}));
    }
}
