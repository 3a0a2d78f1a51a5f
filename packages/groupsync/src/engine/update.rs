//! Change summaries handed back to the embedding application after a
//! maintenance pass, one per grouped query that actually changed.

use super::connection::GroupConnection;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::sync::Arc;

/// How a group changed during a pass.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GroupDeltaKind {
    /// An existing group's edges, count, or page info changed.
    Patched,
    /// A previously-unseen dimension tuple got a brand-new group.
    Synthesized,
}

/// One changed group within a query's updated connection set.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GroupDelta {
    pub dimension_values: Vec<SmolStr>,
    pub kind: GroupDeltaKind,
    pub edge_count: usize,
    pub total_count: Option<i64>,
}

/// Summary of one grouped query's maintenance pass.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GroupViewUpdate {
    pub query_id: String,
    pub groups: Vec<GroupDelta>,
}

impl GroupViewUpdate {
    /// Diff two passes by connection identity. Relies on the maintainer
    /// keeping existing connections in place order and appending
    /// synthesized ones.
    pub fn from_passes(
        query_id: &str,
        before: &[Arc<GroupConnection>],
        after: &[Arc<GroupConnection>],
    ) -> Self {
        let mut groups = Vec::new();
        for (i, connection) in after.iter().enumerate() {
            let kind = if i < before.len() {
                if Arc::ptr_eq(&before[i], connection) {
                    continue;
                }
                GroupDeltaKind::Patched
            } else {
                GroupDeltaKind::Synthesized
            };

            groups.push(GroupDelta {
                dimension_values: connection.dimension_values.clone(),
                kind,
                edge_count: connection.edges.len(),
                total_count: connection.total_count,
            });
        }

        Self {
            query_id: query_id.to_string(),
            groups,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
