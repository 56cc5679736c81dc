//! Per-caller access rules and their composition with base requests.
//!
//! Composition never errors: a caller whose rules admit nothing gets
//! `Never` and empty results, not an exception.

use crate::{
    condition::Condition,
    modification::Modification,
    path::FieldPath,
    schema::{ValidateError, validate_condition, validate_modification, validate_path},
    traits::{FieldValue, FieldValues, Model},
};
use derive_more::Deref;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;

///
/// ModelPermissions
///
/// An immutable bundle of access rules for one model: row-level conditions
/// per operation, read-time redactions, update restrictions and a
/// create-time rewrite hook. Built once per caller context and composed
/// with base requests; never mutated.
///

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct ModelPermissions<M> {
    pub read: Condition,
    pub write: Condition,
    pub create: Condition,
    pub delete: Condition,
    pub read_mask: Mask,
    pub update_restrictions: Vec<FieldPath>,
    pub create_interceptor: Option<Modification>,
    #[serde(skip)]
    _marker: PhantomData<fn() -> M>,
}

impl<M> ModelPermissions<M> {
    /// Permit everything, mask nothing.
    #[must_use]
    pub const fn unrestricted() -> Self {
        Self {
            read: Condition::Always,
            write: Condition::Always,
            create: Condition::Always,
            delete: Condition::Always,
            read_mask: Mask::empty(),
            update_restrictions: Vec::new(),
            create_interceptor: None,
            _marker: PhantomData,
        }
    }

    /// Deny everything.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            read: Condition::Never,
            write: Condition::Never,
            create: Condition::Never,
            delete: Condition::Never,
            read_mask: Mask::empty(),
            update_restrictions: Vec::new(),
            create_interceptor: None,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn with_read(mut self, read: Condition) -> Self {
        self.read = read;
        self
    }

    #[must_use]
    pub fn with_write(mut self, write: Condition) -> Self {
        self.write = write;
        self
    }

    #[must_use]
    pub fn with_create(mut self, create: Condition) -> Self {
        self.create = create;
        self
    }

    #[must_use]
    pub fn with_delete(mut self, delete: Condition) -> Self {
        self.delete = delete;
        self
    }

    #[must_use]
    pub fn with_read_mask(mut self, mask: Mask) -> Self {
        self.read_mask = mask;
        self
    }

    /// Forbid updates that touch any of `paths`.
    #[must_use]
    pub fn restrict_updates(mut self, paths: impl IntoIterator<Item = FieldPath>) -> Self {
        self.update_restrictions.extend(paths);
        self
    }

    /// Rewrite inbound records with `step` before the create check runs.
    #[must_use]
    pub fn with_create_interceptor(mut self, step: Modification) -> Self {
        self.create_interceptor = Some(step);
        self
    }

    /// Effective condition for reads.
    #[must_use]
    pub fn read_filter(&self, base: &Condition) -> Condition {
        Condition::and(vec![base.clone(), self.read.clone()]).simplify()
    }

    /// Effective condition for deletes.
    #[must_use]
    pub fn delete_filter(&self, base: &Condition) -> Condition {
        Condition::and(vec![base.clone(), self.delete.clone()]).simplify()
    }

    /// Effective condition for updates. A modification touching a
    /// restricted field is authorized against nothing, whatever the base.
    #[must_use]
    pub fn write_filter(&self, base: &Condition, modification: &Modification) -> Condition {
        if self.restricts(modification) {
            return Condition::Never;
        }
        Condition::and(vec![base.clone(), self.write.clone()]).simplify()
    }

    /// Whether `modification` touches a restricted field. Touch means one
    /// path is a prefix of the other, so a whole-record step touches
    /// every restriction.
    #[must_use]
    pub fn restricts(&self, modification: &Modification) -> bool {
        let touched = modification.touched_paths();
        self.update_restrictions
            .iter()
            .any(|restricted| touched.iter().any(|path| path.overlaps(restricted)))
    }
}

impl<M: Model> ModelPermissions<M> {
    /// Run the create interceptor, then the create check. `None` when the
    /// record is denied or the rewrite breaks its shape.
    #[must_use]
    pub fn admit_create(&self, record: M) -> Option<M> {
        let record = match &self.create_interceptor {
            Some(step) => step.apply(&record)?,
            None => record,
        };
        self.create.evaluate(&record).then_some(record)
    }

    /// Redact a record before it is returned to the caller.
    #[must_use]
    pub fn mask_record(&self, record: M) -> Option<M> {
        self.read_mask.apply(record)
    }

    /// Check every embedded expression against the model schema.
    pub fn validate(&self) -> Result<(), ValidateError> {
        let schema = M::schema();
        validate_condition(schema, &self.read)?;
        validate_condition(schema, &self.write)?;
        validate_condition(schema, &self.create)?;
        validate_condition(schema, &self.delete)?;
        for rule in self.read_mask.iter() {
            validate_condition(schema, &rule.when)?;
            validate_modification(schema, &rule.redact)?;
        }
        for path in &self.update_restrictions {
            validate_path(schema, path)?;
        }
        if let Some(step) = &self.create_interceptor {
            validate_modification(schema, step)?;
        }
        Ok(())
    }
}

///
/// Mask
///
/// Ordered redaction rules applied to every record a read returns. Rules
/// run in order on the running result, so later rules see earlier
/// redactions.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq, Serialize, Deserialize)]
pub struct Mask(Vec<MaskRule>);

impl Mask {
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub const fn new(rules: Vec<MaskRule>) -> Self {
        Self(rules)
    }

    /// Add a rule: when `when` matches the record, apply `redact`.
    #[must_use]
    pub fn rule(mut self, when: Condition, redact: Modification) -> Self {
        self.0.push(MaskRule { when, redact });
        self
    }

    /// Redact `record` through every matching rule. `None` when a
    /// redaction breaks the record's shape.
    #[must_use]
    pub fn apply<R: FieldValue + FieldValues>(&self, record: R) -> Option<R> {
        self.0.iter().try_fold(record, |record, rule| {
            if rule.when.evaluate(&record) {
                rule.redact.apply(&record)
            } else {
                Some(record)
            }
        })
    }
}

///
/// MaskRule
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MaskRule {
    pub when: Condition,
    pub redact: Modification,
}

///
/// TESTS
///
