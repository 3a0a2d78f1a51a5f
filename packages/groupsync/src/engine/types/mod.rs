mod field_value;
mod keys;
mod operation;
mod path;

pub use field_value::FieldValue;
pub use keys::{composite_key, FastHashSet, FastMap, RecordId, COMPOSITE_KEY_SEPARATOR};
pub use operation::{MutationBatch, Operation};
pub use path::Path;
