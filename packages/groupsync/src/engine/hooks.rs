//! Collaborators the maintenance pass consumes but does not own.
//!
//! The root-filter predicate must be the same predicate the authoritative
//! source applies server-side, and the cursor encoder must stay consistent
//! with the cursors the source issued — otherwise cached membership and
//! ordering drift. Failures inside a hook propagate to the caller; the core
//! neither catches nor retries them.

use super::types::FieldValue;
use serde_json::Value;
use smol_str::SmolStr;

/// Root-filter predicate: does a record match the query's filter expression?
pub trait RecordFilter: Send + Sync {
    fn matches(&self, record: &FieldValue, filter: &Value) -> bool;
}

/// Filter predicate that accepts every record. Matches the behavior of a
/// grouped query with an empty root filter.
#[derive(Clone, Copy, Debug, Default)]
pub struct MatchAll;

impl RecordFilter for MatchAll {
    fn matches(&self, _record: &FieldValue, _filter: &Value) -> bool {
        true
    }
}

/// Adapter turning a closure into a [`RecordFilter`].
pub struct FilterFn<F>(F);

impl<F> FilterFn<F>
where
    F: Fn(&FieldValue, &Value) -> bool + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> RecordFilter for FilterFn<F>
where
    F: Fn(&FieldValue, &Value) -> bool + Send + Sync,
{
    fn matches(&self, record: &FieldValue, filter: &Value) -> bool {
        (self.0)(record, filter)
    }
}

/// Pure cursor derivation: an opaque, order-preserving token, stable for
/// identical records.
pub trait CursorEncoder: Send + Sync {
    fn encode(&self, record: &FieldValue) -> SmolStr;
}

/// Default encoder: blake3 of the record's id. Deterministic and opaque;
/// identical records always produce identical cursors.
#[derive(Clone, Copy, Debug, Default)]
pub struct HashCursor;

impl CursorEncoder for HashCursor {
    fn encode(&self, record: &FieldValue) -> SmolStr {
        let id = record.record_id().unwrap_or("");
        SmolStr::new(blake3::hash(id.as_bytes()).to_hex().as_str())
    }
}

/// Adapter turning a closure into a [`CursorEncoder`].
pub struct CursorFn<F>(F);

impl<F> CursorFn<F>
where
    F: Fn(&FieldValue) -> SmolStr + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> CursorEncoder for CursorFn<F>
where
    F: Fn(&FieldValue) -> SmolStr + Send + Sync,
{
    fn encode(&self, record: &FieldValue) -> SmolStr {
        (self.0)(record)
    }
}

#[cfg(test)]
mod hooks_tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_match_all() {
        let record: FieldValue = json!({ "id": "r1" }).into();
        assert!(MatchAll.matches(&record, &json!({ "anything": true })));
    }

    #[test]
    fn test_closure_filter() {
        let only_open = FilterFn::new(|record: &FieldValue, _filter: &Value| {
            record.get("stage").and_then(FieldValue::as_str) == Some("open")
        });

        let open: FieldValue = json!({ "stage": "open" }).into();
        let closed: FieldValue = json!({ "stage": "closed" }).into();
        assert!(only_open.matches(&open, &json!({})));
        assert!(!only_open.matches(&closed, &json!({})));
    }

    #[test]
    fn test_hash_cursor_stability() {
        let a: FieldValue = json!({ "id": "r1", "name": "Ada" }).into();
        let b: FieldValue = json!({ "id": "r1" }).into();
        let c: FieldValue = json!({ "id": "r2" }).into();

        assert_eq!(HashCursor.encode(&a), HashCursor.encode(&b));
        assert_ne!(HashCursor.encode(&a), HashCursor.encode(&c));
        assert!(!HashCursor.encode(&a).is_empty());
    }

    #[test]
    fn test_closure_cursor() {
        let by_id = CursorFn::new(|record: &FieldValue| {
            SmolStr::new(record.record_id().unwrap_or("?"))
        });
        let record: FieldValue = json!({ "id": "r9" }).into();
        assert_eq!(by_id.encode(&record).as_str(), "r9");
    }
}
