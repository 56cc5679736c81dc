//! Core types for SiftDB: the serializable condition/modification algebra,
//! its direct interpreter and simplifier, schema validation, and the
//! permission layer and storage contract built on top of them.
#![warn(unreachable_pub)]

extern crate self as siftdb;

pub mod condition;
pub mod field;
pub mod modification;
pub mod path;
pub mod permission;
pub mod schema;
pub mod store;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod testing;

pub use crate::traits::{FieldValue, FieldValues, Model};
pub use siftdb_derive::Model;

///
/// Prelude
///
/// The vocabulary needed to define models and run queries against a store.
///

pub mod prelude {
    pub use crate::{
        Model,
        condition::Condition,
        field::Field,
        modification::Modification,
        path::FieldPath,
        permission::{Mask, MaskRule, ModelPermissions},
        store::{Direction, EntryChange, MemoryStore, SecuredStore, Sort, Storage, StoreError},
        traits::{FieldValue, FieldValues},
        value::{Bytes, Float64, Value},
    };
}
