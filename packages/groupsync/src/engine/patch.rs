//! Applies one mutation batch to one cached group connection.
//!
//! Pure over its inputs: the patcher returns new edges, page info, and a
//! count delta; the maintainer decides whether anything actually changed.

use super::connection::{Edge, GroupConnection, PageInfo};
use super::maintain::MaintainContext;
use super::membership::belongs_to_group;
use super::store::RecordStore;
use super::types::{MutationBatch, Operation};

/// Insertion point for an edge entering a cached page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Placement {
    Head,
    Tail,
}

/// Records created while the view is cached go to the head of the page
/// (most-recent-first ordering assumption for new items).
pub(crate) const CREATED_RECORD_PLACEMENT: Placement = Placement::Head;

/// Records that newly qualify on update go to the tail: they did not just
/// arrive, so head ordering tied to creation recency is left alone. The
/// asymmetry with creates is intentional ordering policy; change it here,
/// not in the transition logic.
pub(crate) const REQUALIFIED_RECORD_PLACEMENT: Placement = Placement::Tail;

/// Result of patching one connection with one batch.
#[derive(Clone, Debug)]
pub struct ConnectionPatch {
    pub edges: Vec<Edge>,
    pub page_info: PageInfo,
    pub total_count_delta: i64,
}

impl ConnectionPatch {
    /// A patch that changed neither the count nor the number of edges is
    /// treated as a no-op, letting the maintainer hand back the original
    /// connection untouched.
    pub fn is_noop(&self, original: &GroupConnection) -> bool {
        self.total_count_delta == 0 && self.edges.len() == original.edges.len()
    }
}

/// Run every record of the batch through the membership state table against
/// one cached connection.
///
/// Presence is a linear scan of the evolving edge list by record id —
/// O(edges × records), fine while cached pages stay small, worth an index
/// if they ever do not. Scanning the evolving list (not a snapshot) keeps
/// same-batch duplicates out and removal indices fresh.
pub fn patch_connection(
    connection: &GroupConnection,
    batch: &MutationBatch,
    ctx: &MaintainContext<'_>,
) -> ConnectionPatch {
    let mut edges = connection.edges.clone();
    let mut page_info = connection.page_info.clone();
    let mut total_count_delta = 0i64;

    for record in &batch.records {
        let Some(node) = RecordStore::to_reference(record) else {
            continue;
        };

        let matches_filter = ctx.filter.matches(record, ctx.root_filter);
        let belongs = belongs_to_group(record, &connection.dimension_values, ctx.dimensions);
        let position = edges.iter().position(|e| e.node == node);

        match batch.operation {
            Operation::Create => {
                let should_add = (!ctx.match_root_filter_on_create || matches_filter)
                    && belongs
                    && position.is_none();
                if should_add {
                    let edge = ctx.new_edge(record, node);
                    insert_edge(&mut edges, &mut page_info, edge, CREATED_RECORD_PLACEMENT);
                    total_count_delta += 1;
                }
            }
            Operation::Update => {
                let should_be_in_group = matches_filter && belongs;
                match (should_be_in_group, position) {
                    (true, None) => {
                        let edge = ctx.new_edge(record, node);
                        insert_edge(&mut edges, &mut page_info, edge, REQUALIFIED_RECORD_PLACEMENT);
                        total_count_delta += 1;
                    }
                    (false, Some(index)) => {
                        edges.remove(index);
                        total_count_delta -= 1;
                    }
                    _ => {}
                }
            }
            Operation::Delete => {
                if let Some(index) = position {
                    edges.remove(index);
                    total_count_delta -= 1;
                }
            }
        }
    }

    ConnectionPatch {
        edges,
        page_info,
        total_count_delta,
    }
}

fn insert_edge(edges: &mut Vec<Edge>, page_info: &mut PageInfo, edge: Edge, placement: Placement) {
    match placement {
        Placement::Head => {
            page_info.start_cursor = Some(edge.cursor.clone());
            edges.insert(0, edge);
        }
        Placement::Tail => {
            edges.push(edge);
        }
    }
}
