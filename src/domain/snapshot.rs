// Snapshot parsing - turns whatever shape the realtime store delivers into readings
use super::telemetry::{NormalizedSeries, Reading};
use serde_json::Value;

const VALUE_KEYS: [&str; 2] = ["value", "val"];
const TIMESTAMP_KEYS: [&str; 3] = ["ts", "timestamp", "time"];

/// Normalize a raw payload.
///
/// Accepted shapes:
/// - `null` or a boolean → no data
/// - a number or numeric string → latest reading stamped `now_ms`, no history
/// - a record with a `value` field → a single reading (`ts`, then `timestamp`, then `now_ms`)
/// - anything else is a collection of entries keyed by sortable ids
///
/// Values that are not numeric come through as NaN so later stages can
/// treat them as missing. Readings stamped with `now_ms` are flagged
/// `clock_stamped`.
pub fn parse_snapshot(raw: &Value, now_ms: i64) -> NormalizedSeries {
    match raw {
        Value::Null | Value::Bool(_) => NormalizedSeries::empty(),
        Value::Number(_) | Value::String(_) => NormalizedSeries {
            latest: Some(Reading::new(coerce_number(raw), Some(now_ms))),
            points: Vec::new(),
            clock_stamped: true,
        },
        Value::Object(record) if record.contains_key("value") => {
            let ts = field(raw, "ts")
                .or_else(|| field(raw, "timestamp"))
                .and_then(coerce_timestamp);
            let reading = Reading::new(coerce_number(&record["value"]), Some(ts.unwrap_or(now_ms)));
            NormalizedSeries {
                latest: Some(reading),
                points: vec![reading],
                clock_stamped: ts.is_none(),
            }
        }
        Value::Object(entries) => collect_entries(entries.values()),
        Value::Array(entries) => collect_entries(entries.iter()),
    }
}

fn collect_entries<'a>(entries: impl Iterator<Item = &'a Value>) -> NormalizedSeries {
    let mut points: Vec<Reading> = entries
        .filter_map(|entry| {
            let value = VALUE_KEYS
                .iter()
                .find_map(|key| field(entry, key))
                .unwrap_or(entry);
            if value.is_null() {
                return None;
            }
            let timestamp = TIMESTAMP_KEYS
                .iter()
                .find_map(|key| field(entry, key))
                .and_then(coerce_timestamp);
            Some(Reading::new(coerce_number(value), timestamp))
        })
        .collect();

    // Stable: entries without a timestamp keep their encounter order at 0
    points.sort_by_key(|reading| reading.timestamp.unwrap_or(0));

    NormalizedSeries {
        latest: points.last().copied(),
        points,
        clock_stamped: false,
    }
}

fn field<'a>(entry: &'a Value, key: &str) -> Option<&'a Value> {
    entry.get(key).filter(|v| !v.is_null())
}

fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse::<f64>().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}

fn coerce_timestamp(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}
