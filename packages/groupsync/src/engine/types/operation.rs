use super::field_value::FieldValue;

/// Kind of mutation applied to a batch of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl Operation {
    /// Convert from string representation (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "create" => Some(Operation::Create),
            "update" => Some(Operation::Update),
            "delete" => Some(Operation::Delete),
            _ => None,
        }
    }

    /// Can this operation put records into groups (Create or Update)?
    /// Only additive batches feed new-group synthesis.
    #[inline]
    pub fn is_additive(&self) -> bool {
        matches!(self, Operation::Create | Operation::Update)
    }
}

/// One batch of mutated records with its operation kind.
///
/// Built by the write path right after persistence succeeds, consumed once
/// by the view maintainer, then discarded.
#[derive(Debug, Clone)]
pub struct MutationBatch {
    pub operation: Operation,
    pub records: Vec<FieldValue>,
}

impl MutationBatch {
    pub fn new(operation: Operation, records: Vec<FieldValue>) -> Self {
        Self { operation, records }
    }

    pub fn create(records: Vec<FieldValue>) -> Self {
        Self::new(Operation::Create, records)
    }

    pub fn update(records: Vec<FieldValue>) -> Self {
        Self::new(Operation::Update, records)
    }

    pub fn delete(records: Vec<FieldValue>) -> Self {
        Self::new(Operation::Delete, records)
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
