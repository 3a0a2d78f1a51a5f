//! Builds connections for dimension-value tuples the cache has never seen.
//!
//! Runs after the patcher, against the already-updated connection list, so
//! a group the patcher just started populating is never recreated here.

use super::connection::{Edge, GroupConnection, PageInfo};
use super::maintain::MaintainContext;
use super::normalize::normalize_value;
use super::store::RecordStore;
use super::types::{composite_key, FastHashSet, FieldValue, MutationBatch, Operation};
use indexmap::IndexMap;
use smallvec::SmallVec;
use smol_str::SmolStr;
use std::sync::Arc;

/// Normalized tuple of one record's dimension values; inline for the
/// typical one- or two-dimension grouping.
type DimensionTuple = SmallVec<[SmolStr; 2]>;

struct PendingGroup {
    dimension_values: DimensionTuple,
    edges: Vec<Edge>,
}

/// Collect batch records whose dimension tuples match no existing group and
/// build one new connection per unseen tuple, merging same-tuple records in
/// batch order.
pub fn synthesize_new_groups(
    updated: &[Arc<GroupConnection>],
    batch: &MutationBatch,
    ctx: &MaintainContext<'_>,
) -> Vec<GroupConnection> {
    // An incomplete grouping configuration cannot name a group.
    if ctx.dimensions.is_empty() {
        return Vec::new();
    }

    let existing: FastHashSet<SmolStr> =
        updated.iter().map(|conn| conn.composite_key()).collect();

    let mut pending: IndexMap<SmolStr, PendingGroup> = IndexMap::new();

    for record in &batch.records {
        if ctx.match_root_filter_on_create
            && batch.operation == Operation::Create
            && !ctx.filter.matches(record, ctx.root_filter)
        {
            continue;
        }

        let Some(node) = RecordStore::to_reference(record) else {
            continue;
        };

        // An incomplete key cannot be grouped.
        let Some(values) = dimension_tuple(record, ctx) else {
            continue;
        };

        let key = composite_key(&values);
        if existing.contains(&key) {
            continue;
        }

        let group = pending.entry(key).or_insert_with(|| PendingGroup {
            dimension_values: values,
            edges: Vec::new(),
        });
        group.edges.push(ctx.new_edge(record, node));
    }

    pending
        .into_values()
        .filter(|group| !group.edges.is_empty())
        .map(|group| GroupConnection {
            typename: ctx.connection_typename.clone(),
            dimension_values: group.dimension_values.into_vec(),
            page_info: PageInfo {
                start_cursor: group.edges.first().map(|e| e.cursor.clone()),
                end_cursor: group.edges.last().map(|e| e.cursor.clone()),
                has_next_page: Some(false),
                has_previous_page: Some(false),
            },
            total_count: Some(group.edges.len() as i64),
            edges: group.edges,
        })
        .collect()
}

/// The record's full normalized dimension tuple, or `None` when any
/// dimension's source value is missing.
fn dimension_tuple(record: &FieldValue, ctx: &MaintainContext<'_>) -> Option<DimensionTuple> {
    let mut values = DimensionTuple::with_capacity(ctx.dimensions.len());
    for spec in ctx.dimensions {
        let actual = spec.resolve_value(record)?;
        values.push(normalize_value(actual, spec.bucket.as_ref()));
    }
    Some(values)
}
