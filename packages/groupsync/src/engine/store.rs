//! In-memory record store backing the cached group connections.
//!
//! Edges hold record references (ids), not value copies; any two edges
//! carrying the same id resolve to the same row here.

use super::types::{FastMap, FieldValue, RecordId};

#[derive(Clone, Debug, Default)]
pub struct RecordStore {
    rows: FastMap<RecordId, FieldValue>,
}

impl RecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Insert or replace a record's row. Records without an id cannot be
    /// referenced and are not stored.
    pub fn upsert(&mut self, record: FieldValue) -> Option<RecordId> {
        let id = RecordId::new(record.record_id()?);
        self.rows.insert(id.clone(), record);
        Some(id)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        self.rows.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&FieldValue> {
        self.rows.get(id)
    }

    /// Accessor matching the cache store contract: a named field of the
    /// record a reference points at.
    pub fn read_field(&self, id: &str, field: &str) -> Option<&FieldValue> {
        self.rows.get(id)?.get(field)
    }

    /// Reference for a record value; `None` when the record carries no id.
    pub fn to_reference(record: &FieldValue) -> Option<RecordId> {
        record.record_id().map(RecordId::new)
    }
}
