//! The maintenance pass: applies one mutation batch to a grouped query's
//! cached connections and returns the updated set.
//!
//! Connections are shared via `Arc`; a pass that leaves a connection
//! untouched returns the same `Arc`, so callers can short-circuit
//! re-render and invalidation with a pointer comparison. The pass runs to
//! completion, strictly in batch order, with no suspension points — the
//! synthesizer's "already accounted for" check depends on connections
//! already reflecting the patcher's results.

use super::connection::{connection_typename, edge_typename, Edge, GroupConnection};
use super::descriptor::{DimensionSpec, ObjectDescriptor, QueryDescriptor};
use super::hooks::{CursorEncoder, RecordFilter};
use super::patch::patch_connection;
use super::synthesize::synthesize_new_groups;
use super::types::{FieldValue, MutationBatch, RecordId};
use serde_json::Value;
use smol_str::SmolStr;
use std::sync::Arc;
use tracing::debug;

/// Shared inputs for one maintenance pass over one grouped query.
pub struct MaintainContext<'a> {
    pub root_filter: &'a Value,
    pub dimensions: &'a [DimensionSpec],
    pub match_root_filter_on_create: bool,
    pub filter: &'a dyn RecordFilter,
    pub cursors: &'a dyn CursorEncoder,
    pub edge_typename: SmolStr,
    pub connection_typename: SmolStr,
}

impl<'a> MaintainContext<'a> {
    pub fn new(
        descriptor: &'a QueryDescriptor,
        object: &ObjectDescriptor,
        filter: &'a dyn RecordFilter,
        cursors: &'a dyn CursorEncoder,
        match_root_filter_on_create: bool,
    ) -> Self {
        Self {
            root_filter: &descriptor.filter,
            dimensions: &descriptor.dimensions,
            match_root_filter_on_create,
            filter,
            cursors,
            edge_typename: edge_typename(&object.name_singular),
            connection_typename: connection_typename(&object.name_singular),
        }
    }

    /// Build an edge for a referenced record.
    pub(crate) fn new_edge(&self, record: &FieldValue, node: RecordId) -> Edge {
        Edge {
            typename: self.edge_typename.clone(),
            node,
            cursor: self.cursors.encode(record),
        }
    }
}

/// Outcome of one maintenance pass. When `changed` is false every element
/// of `connections` is pointer-equal to its cached counterpart.
pub struct MaintainResult {
    pub connections: Vec<Arc<GroupConnection>>,
    pub changed: bool,
}

/// Apply a mutation batch to the cached connections of one grouped query.
///
/// Existing connections are patched in place order; for additive batches
/// the already-updated list then feeds new-group synthesis, so a group the
/// patcher just started populating is never synthesized a second time.
pub fn maintain_connections(
    cached: &[Arc<GroupConnection>],
    batch: &MutationBatch,
    ctx: &MaintainContext<'_>,
) -> MaintainResult {
    let mut changed = false;
    let mut connections: Vec<Arc<GroupConnection>> = Vec::with_capacity(cached.len());

    for connection in cached {
        let patch = patch_connection(connection, batch, ctx);
        if patch.is_noop(connection) {
            connections.push(Arc::clone(connection));
            continue;
        }

        changed = true;
        connections.push(Arc::new(GroupConnection {
            typename: connection.typename.clone(),
            dimension_values: connection.dimension_values.clone(),
            edges: patch.edges,
            page_info: patch.page_info,
            // advances only when previously known; unknown stays unknown
            total_count: connection.total_count.map(|count| count + patch.total_count_delta),
        }));
    }

    if batch.operation.is_additive() {
        let synthesized = synthesize_new_groups(&connections, batch, ctx);
        if !synthesized.is_empty() {
            changed = true;
            connections.extend(synthesized.into_iter().map(Arc::new));
        }
    }

    if changed {
        debug!(groups = connections.len(), records = batch.records.len(), "grouped view updated");
    }

    MaintainResult {
        connections,
        changed,
    }
}
