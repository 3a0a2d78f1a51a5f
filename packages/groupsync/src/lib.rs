pub mod engine;
pub mod service;

// Re-export commonly used types for convenience
pub use engine::cache::{GroupQueryCache, GroupedQuery};
pub use engine::connection::{Edge, GroupConnection, PageInfo};
pub use engine::descriptor::{
    BucketConfig, DimensionSpec, Granularity, ObjectDescriptor, QueryDescriptor,
};
pub use engine::hooks::{CursorEncoder, CursorFn, FilterFn, HashCursor, MatchAll, RecordFilter};
pub use engine::maintain::{maintain_connections, MaintainContext, MaintainResult};
pub use engine::store::RecordStore;
pub use engine::types::{FastMap, FieldValue, MutationBatch, Operation, Path, RecordId};
pub use engine::update::{GroupDelta, GroupDeltaKind, GroupViewUpdate};
