//! Data models for publication records.
//!
//! - [`PublicationRecord`]: one entry exactly as the source supplied it
//! - [`NormalizedRecord`]: a record plus the sort key derived from its date
//! - [`Settings`]: resolved run configuration
//!
//! Records are kept as loose JSON objects so that any field the source adds
//! survives the round trip untouched, in its original position.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use url::Url;

/// Name of the free-form date field every record is expected to carry.
pub const DATE_FIELD: &str = "date";

/// Name of the optional derived field written by `--emit-timestamp`.
pub const TIMESTAMP_FIELD: &str = "timestamp";

/// A single publication as provided by a source.
///
/// Only the `date` field is interpreted; everything else (title, authors,
/// venue, ids, ...) passes through verbatim.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct PublicationRecord(pub Map<String, Value>);

impl PublicationRecord {
    /// The raw `date` value, if present.
    pub fn date(&self) -> Option<&Value> {
        self.0.get(DATE_FIELD)
    }

    /// Replace the `date` value, keeping the field's position.
    pub fn set_date(&mut self, date: String) {
        self.0.insert(DATE_FIELD.to_string(), Value::String(date));
    }

    /// The `title` field as a string, for logging.
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }
}

impl From<Map<String, Value>> for PublicationRecord {
    fn from(map: Map<String, Value>) -> Self {
        PublicationRecord(map)
    }
}

/// A record whose date has been canonicalized.
///
/// `sort_key` is epoch milliseconds (UTC). `None` marks a date that could not
/// be parsed; such records are kept and ordered after every dated record.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub record: PublicationRecord,
    pub sort_key: Option<i64>,
}

impl NormalizedRecord {
    /// Consume into the JSON object that ends up in the output file.
    pub fn into_output(self, emit_timestamp: bool) -> Map<String, Value> {
        let mut map = self.record.0;
        if emit_timestamp {
            let ts = self.sort_key.map(Value::from).unwrap_or(Value::Null);
            map.insert(TIMESTAMP_FIELD.to_string(), ts);
        }
        map
    }
}

/// Resolved configuration for a single run.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Sources, consulted in order.
    pub sources: Vec<Url>,
    /// Destination file, replaced in full on success.
    pub output: PathBuf,
    /// Keep the derived epoch-millisecond `timestamp` in each output record.
    pub emit_timestamp: bool,
}

/// What a successful run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub sources: usize,
    pub records: usize,
    pub undated: usize,
    pub output: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> PublicationRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_record_deserialization_keeps_unknown_fields() {
        let rec = record(json!({
            "title": "A",
            "date": "2020-01-01",
            "eprintid": 1234,
            "creators": [{"name": {"family": "Smith", "given": "J"}}]
        }));

        assert_eq!(rec.title(), Some("A"));
        assert_eq!(rec.date(), Some(&json!("2020-01-01")));
        assert_eq!(rec.0["eprintid"], json!(1234));
        assert_eq!(rec.0.len(), 4);
    }

    #[test]
    fn test_set_date_keeps_field_position() {
        let mut rec = record(json!({"title": "A", "date": "2020", "type": "article"}));
        rec.set_date("2020-01-01T00:00:00.000Z".to_string());

        let keys: Vec<&str> = rec.0.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["title", "date", "type"]);
        assert_eq!(rec.date(), Some(&json!("2020-01-01T00:00:00.000Z")));
    }

    #[test]
    fn test_record_serializes_as_plain_object() {
        let rec = record(json!({"title": "A", "date": "2020"}));
        let json = serde_json::to_string(&rec).unwrap();
        assert_eq!(json, r#"{"title":"A","date":"2020"}"#);
    }

    #[test]
    fn test_into_output_without_timestamp() {
        let normalized = NormalizedRecord {
            record: record(json!({"title": "A", "timestamp": "upstream"})),
            sort_key: Some(42),
        };
        let out = normalized.into_output(false);
        assert_eq!(out["timestamp"], json!("upstream"));
    }

    #[test]
    fn test_into_output_with_timestamp() {
        let dated = NormalizedRecord {
            record: record(json!({"title": "A"})),
            sort_key: Some(1577836800000),
        };
        let undated = NormalizedRecord {
            record: record(json!({"title": "B"})),
            sort_key: None,
        };

        assert_eq!(dated.into_output(true)["timestamp"], json!(1577836800000_i64));
        assert_eq!(undated.into_output(true)["timestamp"], Value::Null);
    }
}
