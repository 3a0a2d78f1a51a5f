//! Registry of grouped queries sharing one record store.
//!
//! The cache owns the injected collaborators and fans a mutation batch out
//! to every registered query. Each query's maintenance pass is sequential;
//! with the `parallel` feature, independent queries run on the rayon pool.

use super::connection::GroupConnection;
use super::descriptor::{ObjectDescriptor, QueryDescriptor};
use super::hooks::{CursorEncoder, HashCursor, MatchAll, RecordFilter};
use super::maintain::{maintain_connections, MaintainContext};
use super::store::RecordStore;
use super::types::{MutationBatch, Operation};
use super::update::GroupViewUpdate;
use std::sync::Arc;

#[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
use rayon::prelude::*;

/// One registered grouped query: its identity (the store-field key), shape,
/// and current cached connections.
pub struct GroupedQuery {
    pub id: String,
    pub object: ObjectDescriptor,
    pub descriptor: QueryDescriptor,
    pub connections: Vec<Arc<GroupConnection>>,
}

impl GroupedQuery {
    pub fn new(
        id: impl Into<String>,
        object: ObjectDescriptor,
        descriptor: QueryDescriptor,
        connections: Vec<GroupConnection>,
    ) -> Self {
        Self {
            id: id.into(),
            object,
            descriptor,
            connections: connections.into_iter().map(Arc::new).collect(),
        }
    }

    /// Run one maintenance pass; `None` when nothing changed, so callers
    /// can suppress downstream invalidation.
    fn apply(
        &mut self,
        batch: &MutationBatch,
        match_root_filter_on_create: bool,
        filter: &dyn RecordFilter,
        cursors: &dyn CursorEncoder,
    ) -> Option<GroupViewUpdate> {
        let ctx = MaintainContext::new(
            &self.descriptor,
            &self.object,
            filter,
            cursors,
            match_root_filter_on_create,
        );
        let result = maintain_connections(&self.connections, batch, &ctx);
        if !result.changed {
            return None;
        }

        let update = GroupViewUpdate::from_passes(&self.id, &self.connections, &result.connections);
        self.connections = result.connections;
        Some(update)
    }
}

/// The cached grouped views of one client, plus the record rows their
/// edges reference.
pub struct GroupQueryCache {
    pub store: RecordStore,
    queries: Vec<GroupedQuery>,
    filter: Box<dyn RecordFilter>,
    cursors: Box<dyn CursorEncoder>,
}

impl Default for GroupQueryCache {
    fn default() -> Self {
        Self::new(Box::new(MatchAll), Box::new(HashCursor))
    }
}

impl GroupQueryCache {
    pub fn new(filter: Box<dyn RecordFilter>, cursors: Box<dyn CursorEncoder>) -> Self {
        Self {
            store: RecordStore::new(),
            queries: Vec::new(),
            filter,
            cursors,
        }
    }

    /// Register a grouped query's cached connections, replacing any
    /// previous registration with the same id.
    pub fn register_query(&mut self, query: GroupedQuery) {
        if let Some(pos) = self.queries.iter().position(|q| q.id == query.id) {
            self.queries[pos] = query;
        } else {
            self.queries.push(query);
        }
    }

    pub fn unregister_query(&mut self, id: &str) {
        self.queries.retain(|q| q.id != id);
    }

    pub fn query_count(&self) -> usize {
        self.queries.len()
    }

    /// Current connections of a registered query.
    pub fn connections(&self, id: &str) -> Option<&[Arc<GroupConnection>]> {
        self.queries
            .iter()
            .find(|q| q.id == id)
            .map(|q| q.connections.as_slice())
    }

    /// Apply one mutation batch: update the record store, then maintain
    /// every registered grouped view. Returns a summary per query that
    /// changed.
    pub fn apply_batch(
        &mut self,
        batch: &MutationBatch,
        match_root_filter_on_create: bool,
    ) -> Vec<GroupViewUpdate> {
        // Storage phase first so edge references resolve during and after
        // the maintenance pass.
        for record in &batch.records {
            match batch.operation {
                Operation::Create | Operation::Update => {
                    self.store.upsert(record.clone());
                }
                Operation::Delete => {
                    if let Some(id) = record.record_id() {
                        self.store.remove(id);
                    }
                }
            }
        }

        let filter = self.filter.as_ref();
        let cursors = self.cursors.as_ref();

        #[cfg(all(feature = "parallel", not(target_arch = "wasm32")))]
        {
            self.queries
                .par_iter_mut()
                .filter_map(|query| query.apply(batch, match_root_filter_on_create, filter, cursors))
                .collect()
        }

        #[cfg(any(target_arch = "wasm32", not(feature = "parallel")))]
        {
            self.queries
                .iter_mut()
                .filter_map(|query| query.apply(batch, match_root_filter_on_create, filter, cursors))
                .collect()
        }
    }
}

#[cfg(test)]
mod cache_tests {
    use super::*;
    use crate::engine::types::FieldValue;
    use crate::engine::update::GroupDeltaKind;
    use serde_json::json;
    use smol_str::SmolStr;

    fn person(id: &str, country: &str) -> FieldValue {
        json!({ "id": id, "country": country }).into()
    }

    fn people_by_country(id: &str) -> GroupedQuery {
        GroupedQuery::new(
            id,
            ObjectDescriptor::new("person", "people"),
            QueryDescriptor::from_variables(&json!({
                "filter": {},
                "groupBy": [{ "country": true }]
            })),
            vec![],
        )
    }

    #[test]
    fn test_register_replaces_by_id() {
        let mut cache = GroupQueryCache::default();
        cache.register_query(people_by_country("q1"));
        cache.register_query(people_by_country("q2"));
        assert_eq!(cache.query_count(), 2);

        cache.register_query(people_by_country("q1"));
        assert_eq!(cache.query_count(), 2);

        cache.unregister_query("q1");
        assert_eq!(cache.query_count(), 1);
        assert!(cache.connections("q1").is_none());
    }

    #[test]
    fn test_apply_batch_updates_store_and_views() {
        let mut cache = GroupQueryCache::default();
        cache.register_query(people_by_country("q1"));

        let updates = cache.apply_batch(&MutationBatch::create(vec![person("p1", "US")]), false);

        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].query_id, "q1");
        assert_eq!(updates[0].groups.len(), 1);
        assert_eq!(updates[0].groups[0].kind, GroupDeltaKind::Synthesized);

        // Row landed in the store and the edge references it.
        assert!(cache.store.get("p1").is_some());
        let connections = cache.connections("q1").unwrap();
        assert_eq!(connections.len(), 1);
        let node = connections[0].edges[0].node.clone();
        assert_eq!(
            cache.store.read_field(&node, "country").and_then(FieldValue::as_str),
            Some("US")
        );
    }

    #[test]
    fn test_no_change_yields_no_updates() {
        let mut cache = GroupQueryCache::default();
        cache.register_query(people_by_country("q1"));
        cache.apply_batch(&MutationBatch::create(vec![person("p1", "US")]), false);

        // Deleting an unknown record changes nothing.
        let updates = cache.apply_batch(&MutationBatch::delete(vec![person("p9", "US")]), false);
        assert!(updates.is_empty());
    }

    #[test]
    fn test_delete_removes_row_and_edge() {
        let mut cache = GroupQueryCache::default();
        cache.register_query(people_by_country("q1"));
        cache.apply_batch(&MutationBatch::create(vec![person("p1", "US")]), false);

        let updates = cache.apply_batch(&MutationBatch::delete(vec![person("p1", "US")]), false);
        assert_eq!(updates.len(), 1);
        assert!(cache.store.get("p1").is_none());

        let connections = cache.connections("q1").unwrap();
        assert_eq!(connections[0].edges.len(), 0);
        assert_eq!(connections[0].total_count, Some(0));
        assert_eq!(connections[0].dimension_values, vec![SmolStr::new("US")]);
    }

    #[test]
    fn test_multiple_queries_maintained_independently() {
        let mut cache = GroupQueryCache::default();
        cache.register_query(people_by_country("by-country"));
        cache.register_query(GroupedQuery::new(
            "by-stage",
            ObjectDescriptor::new("person", "people"),
            QueryDescriptor::from_variables(&json!({
                "filter": {},
                "groupBy": [{ "stage": true }]
            })),
            vec![],
        ));

        let record: FieldValue =
            json!({ "id": "p1", "country": "US", "stage": "open" }).into();
        let mut updates = cache.apply_batch(&MutationBatch::create(vec![record]), false);
        updates.sort_by(|a, b| a.query_id.cmp(&b.query_id));

        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0].query_id, "by-country");
        assert_eq!(updates[1].query_id, "by-stage");

        let by_stage = cache.connections("by-stage").unwrap();
        assert_eq!(by_stage[0].dimension_values, vec![SmolStr::new("open")]);
    }
}
