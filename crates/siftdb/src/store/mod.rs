mod memory;
mod secured;

pub use memory::MemoryStore;
pub use secured::SecuredStore;

use crate::{
    condition::Condition, modification::Modification, path::FieldPath, schema::ValidateError,
    traits::Model,
};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Direction
///

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

///
/// Sort
///
/// One sort key. Records order by the value at `path` under the canonical
/// cross-type ordering; a path that does not resolve sorts like an unset
/// value.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Sort {
    pub path: FieldPath,
    pub direction: Direction,
}

///
/// EntryChange
///
/// Before and after images of one updated record.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntryChange<M> {
    pub before: M,
    pub after: M,
}

///
/// StoreError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum StoreError {
    /// The expression does not fit the model schema.
    #[error("invalid expression for model '{model}': {error}")]
    InvalidExpression {
        model: &'static str,
        error: ValidateError,
    },

    /// A mutation produced a value that no longer decodes as the model.
    #[error("model '{model}' corrupted during {operation}")]
    Corrupt {
        model: &'static str,
        operation: &'static str,
    },

    /// The backend has no representation for a construct. Adapters fail
    /// loudly rather than approximate.
    #[error("backend '{backend}' does not support {construct}")]
    Unsupported {
        backend: &'static str,
        construct: String,
    },
}

///
/// Storage
///
/// The contract every backend implements. Conditions select records, sorts
/// order them, skip/limit page the result. The single-record operations act
/// on the first match in the backend's insertion order.
///

pub trait Storage<M: Model> {
    /// Matching records in sort order, after paging.
    fn find(
        &self,
        condition: &Condition,
        order: &[Sort],
        skip: usize,
        limit: Option<usize>,
    ) -> Result<Vec<M>, StoreError>;

    /// Number of matching records.
    fn count(&self, condition: &Condition) -> Result<u64, StoreError>;

    /// Store new records, returning them as stored.
    fn insert(&mut self, records: Vec<M>) -> Result<Vec<M>, StoreError>;

    /// Apply `modification` to the first matching record.
    fn update_one(
        &mut self,
        condition: &Condition,
        modification: &Modification,
    ) -> Result<Option<EntryChange<M>>, StoreError>;

    /// Apply `modification` to every matching record.
    fn update_many(
        &mut self,
        condition: &Condition,
        modification: &Modification,
    ) -> Result<Vec<EntryChange<M>>, StoreError>;

    /// Remove the first matching record and return it.
    fn delete_one(&mut self, condition: &Condition) -> Result<Option<M>, StoreError>;

    /// Remove every matching record, returning how many were removed.
    fn delete_many(&mut self, condition: &Condition) -> Result<u64, StoreError>;
}
