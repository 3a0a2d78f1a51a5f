//! Cached connection shapes: one bucket of edges per dimension-value tuple,
//! with Relay-style pagination metadata. Serialization matches the wire
//! shape the cache holds (camelCase keys, `__typename` tags).

use super::types::{composite_key, RecordId};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Pagination metadata for one cached page of edges.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_cursor: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_cursor: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_next_page: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_previous_page: Option<bool>,
}

/// A (record reference, cursor) pair within a connection. The node is a
/// reference into the record store, never a value copy: two edges with the
/// same id resolve to the same record.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Edge {
    #[serde(rename = "__typename", default, skip_serializing_if = "SmolStr::is_empty")]
    pub typename: SmolStr,
    pub node: RecordId,
    pub cursor: SmolStr,
}

/// One cached group: the records sharing a dimension-value tuple, their
/// page metadata, and the group's logical total count.
///
/// `total_count` tracks the full count at the source, not `edges.len()`
/// (the cache may hold only a page); once unknown it stays unknown.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GroupConnection {
    #[serde(rename = "__typename", default, skip_serializing_if = "SmolStr::is_empty")]
    pub typename: SmolStr,
    #[serde(default)]
    pub dimension_values: Vec<SmolStr>,
    #[serde(default)]
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub page_info: PageInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_count: Option<i64>,
}

impl GroupConnection {
    /// Composite key of this group's dimension-value tuple.
    pub fn composite_key(&self) -> SmolStr {
        composite_key(&self.dimension_values)
    }

    pub fn contains_record(&self, id: &str) -> bool {
        self.edges.iter().any(|e| e.node == id)
    }
}

/// Wire typename for an edge of the given entity, e.g. `person` → `PersonEdge`.
pub fn edge_typename(name_singular: &str) -> SmolStr {
    SmolStr::new(format!("{}Edge", capitalize(name_singular)))
}

/// Wire typename for a connection of the given entity.
pub fn connection_typename(name_singular: &str) -> SmolStr {
    SmolStr::new(format!("{}Connection", capitalize(name_singular)))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
