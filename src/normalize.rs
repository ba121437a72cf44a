//! Date canonicalization and newest-first ordering.

use crate::dates::{parse_timestamp, to_iso};
use crate::models::{NormalizedRecord, PublicationRecord};
use serde_json::Value;
use std::cmp::Ordering;
use tracing::warn;

/// Derive the sort key from `record.date` and rewrite the date as ISO-8601.
///
/// A missing, non-string or unrecognised date leaves the record as it came
/// and yields `sort_key: None`.
pub fn normalize_record(mut record: PublicationRecord) -> NormalizedRecord {
    let parsed = match record.date() {
        Some(Value::String(raw)) => parse_timestamp(raw).and_then(|ms| Some((ms, to_iso(ms)?))),
        _ => None,
    };

    let sort_key = match parsed {
        Some((ms, iso)) => {
            record.set_date(iso);
            Some(ms)
        }
        None => {
            warn!(
                title = record.title().unwrap_or("<untitled>"),
                date = ?record.date(),
                "Unparseable publication date; record will sort last"
            );
            None
        }
    };

    NormalizedRecord { record, sort_key }
}

/// Newest first; undated records after every dated one.
pub fn newest_first(a: &NormalizedRecord, b: &NormalizedRecord) -> Ordering {
    match (a.sort_key, b.sort_key) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Concatenate per-source batches in order and sort them newest first.
///
/// The sort is stable, so equal keys keep source order then record order.
/// Duplicates across sources are kept.
pub fn aggregate<I>(batches: I) -> Vec<NormalizedRecord>
where
    I: IntoIterator<Item = Vec<NormalizedRecord>>,
{
    let mut all: Vec<NormalizedRecord> = batches.into_iter().flatten().collect();
    all.sort_by(newest_first);
    all
}
