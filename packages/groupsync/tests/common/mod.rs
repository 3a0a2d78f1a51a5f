//! Shared helpers for the grouped-view maintenance tests.
//!
//! Record builders mirror a small CRM-ish data model (people grouped by
//! country, tasks grouped by day) and ids come from ULIDs, matching how the
//! surrounding application generates them.

#![allow(dead_code)]

use groupsync::service;
use groupsync::{
    FieldValue, GroupQueryCache, GroupedQuery, HashCursor, MutationBatch, ObjectDescriptor,
    QueryDescriptor,
};
use serde_json::{json, Value};
use smol_str::SmolStr;
use ulid::Ulid;

/// Generate a unique record id.
pub fn generate_id() -> String {
    Ulid::new().to_string()
}

/// Cursor a maintained edge will carry for this record (the default
/// encoder used by `GroupQueryCache::default`).
pub fn cursor_of(record: &FieldValue) -> SmolStr {
    use groupsync::CursorEncoder;
    HashCursor.encode(record)
}

pub fn person(id: &str, country: &str) -> FieldValue {
    json!({ "id": id, "country": country }).into()
}

pub fn person_with_stage(id: &str, country: &str, stage: &str) -> FieldValue {
    json!({ "id": id, "country": country, "stage": stage }).into()
}

pub fn task(id: &str, created_at: &str) -> FieldValue {
    json!({ "id": id, "createdAt": created_at }).into()
}

/// Register a `people` query grouped by country, seeded with the given
/// connection payloads (wire-shaped JSON).
pub fn register_people_by_country(cache: &mut GroupQueryCache, query_id: &str, connections: Value) {
    let data = service::view::prepare_registration(json!({
        "id": query_id,
        "objectNameSingular": "person",
        "objectNamePlural": "people",
        "storeFieldName": r#"peopleGroupBy({"filter":{},"groupBy":[{"country":true}]})"#,
        "connections": connections,
    }))
    .expect("registration config should parse");
    cache.register_query(data.into_query());
}

/// Register a `task` query grouped by creation day.
pub fn register_tasks_by_day(cache: &mut GroupQueryCache, query_id: &str) {
    cache.register_query(GroupedQuery::new(
        query_id,
        ObjectDescriptor::new("task", "tasks"),
        QueryDescriptor::from_variables(&json!({
            "filter": {},
            "groupBy": [{ "createdAt": { "granularity": "DAY" } }]
        })),
        vec![],
    ));
}

pub fn create(records: Vec<FieldValue>) -> MutationBatch {
    MutationBatch::create(records)
}

pub fn update(records: Vec<FieldValue>) -> MutationBatch {
    MutationBatch::update(records)
}

pub fn delete(records: Vec<FieldValue>) -> MutationBatch {
    MutationBatch::delete(records)
}
