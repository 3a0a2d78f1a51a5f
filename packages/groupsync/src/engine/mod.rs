pub mod cache;
pub mod connection;
pub mod descriptor;
pub mod hooks;
pub mod maintain;
pub mod membership;
pub mod normalize;
pub mod patch;
pub mod store;
pub mod synthesize;
pub mod types;
pub mod update;

pub use cache::{GroupQueryCache, GroupedQuery};
pub use connection::{Edge, GroupConnection, PageInfo};
pub use descriptor::{BucketConfig, DimensionSpec, Granularity, ObjectDescriptor, QueryDescriptor};
pub use maintain::{maintain_connections, MaintainContext, MaintainResult};
pub use types::{FastMap, FieldValue, MutationBatch, Operation, Path, RecordId};
pub use update::{GroupDelta, GroupDeltaKind, GroupViewUpdate};
