//! Canonical comparison keys for dimension values.
//!
//! Grouping compares normalized strings, never raw values: both the cached
//! group's dimension values and a mutated record's field values pass through
//! the same normalization, so a single rule set decides membership and
//! synthesis alike.

use super::descriptor::{BucketConfig, Granularity};
use super::types::{FieldValue, Path};
use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use smol_str::SmolStr;

/// Resolve a nested value using a dot-notation path.
#[inline]
pub fn resolve_nested_value<'a>(
    root: Option<&'a FieldValue>,
    path: &Path,
) -> Option<&'a FieldValue> {
    let mut current = root;
    for part in path.segments() {
        match current {
            Some(FieldValue::Object(map)) => {
                current = map.get(part);
            }
            _ => return None,
        }
    }
    current
}

/// Reduce a raw field value to its canonical comparison key.
///
/// Temporal buckets reduce timestamps to the granularity's key; objects
/// compare by identity (their `id`) or, lacking one, by a deterministic
/// serialization; everything else is a plain string cast. Values that fail
/// to parse under a temporal bucket fall back to the string cast rather
/// than erroring.
pub fn normalize_value(value: &FieldValue, bucket: Option<&BucketConfig>) -> SmolStr {
    if let Some(BucketConfig::Temporal { granularity }) = bucket {
        if let Some(ts) = parse_timestamp(value) {
            if let Some(key) = bucket_key(&ts, *granularity) {
                return key;
            }
        }
        return string_cast(value);
    }

    match value {
        FieldValue::Object(_) => match value.record_id() {
            Some(id) => SmolStr::new(id),
            None => canonical_serialization(value),
        },
        other => string_cast(other),
    }
}

/// Normalize an already-stringly dimension value (a cached group's expected
/// value) through the same rules as a record's field value.
pub fn normalize_str(value: &str, bucket: Option<&BucketConfig>) -> SmolStr {
    normalize_value(&FieldValue::Str(SmolStr::new(value)), bucket)
}

/// Timestamps arrive as RFC 3339 strings, bare dates, or epoch milliseconds.
/// All bucketing happens in UTC.
fn parse_timestamp(value: &FieldValue) -> Option<DateTime<Utc>> {
    match value {
        FieldValue::Str(s) => {
            if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
                return Some(dt.with_timezone(&Utc));
            }
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return Some(date.and_time(NaiveTime::MIN).and_utc());
            }
            None
        }
        FieldValue::Number(n) if n.is_finite() => DateTime::from_timestamp_millis(*n as i64),
        _ => None,
    }
}

fn bucket_key(ts: &DateTime<Utc>, granularity: Granularity) -> Option<SmolStr> {
    let key = match granularity {
        Granularity::Day => SmolStr::new(format!(
            "{:04}-{:02}-{:02}",
            ts.year(),
            ts.month(),
            ts.day()
        )),
        Granularity::Month => SmolStr::new(format!("{:04}-{:02}", ts.year(), ts.month())),
        Granularity::Year => SmolStr::new(format!("{:04}", ts.year())),
        // weekday index as JavaScript counts them: 0 = Sunday .. 6 = Saturday
        Granularity::DayOfTheWeek => {
            SmolStr::new(format!("{}", ts.weekday().num_days_from_sunday()))
        }
        Granularity::MonthOfTheYear => SmolStr::new(format!("{}", ts.month())),
        Granularity::Unknown => return None,
    };
    Some(key)
}

fn string_cast(value: &FieldValue) -> SmolStr {
    match value {
        FieldValue::Str(s) => s.clone(),
        FieldValue::Number(n) => SmolStr::new(format!("{}", n)),
        FieldValue::Bool(true) => SmolStr::new_static("true"),
        FieldValue::Bool(false) => SmolStr::new_static("false"),
        FieldValue::Null => SmolStr::new_static("null"),
        other => canonical_serialization(other),
    }
}

/// Deterministic serialization for id-less structured values. serde_json
/// keeps object keys sorted, so equal values always produce equal keys.
fn canonical_serialization(value: &FieldValue) -> SmolStr {
    SmolStr::new(serde_json::Value::from(value.clone()).to_string())
}
