use crate::{
    condition::Condition,
    modification::Modification,
    permission::ModelPermissions,
    store::{EntryChange, Sort, Storage, StoreError},
    traits::Model,
};

///
/// SecuredStore
///
/// Wraps any storage backend with one caller's [`ModelPermissions`],
/// exposing the same contract: conditions compose with the caller's rules,
/// returned records pass through the read mask, inserts run the create
/// interceptor and check, and updates touching restricted fields compose
/// to `Never` and affect nothing.
///

#[derive(Clone, Debug)]
pub struct SecuredStore<M, S> {
    store: S,
    permissions: ModelPermissions<M>,
}

impl<M: Model, S: Storage<M>> SecuredStore<M, S> {
    /// Wrap `store` behind `permissions`. Permission bundles whose
    /// expressions do not fit the model schema are rejected here, before
    /// any operation runs.
    pub fn new(store: S, permissions: ModelPermissions<M>) -> Result<Self, StoreError> {
        permissions
            .validate()
            .map_err(|error| StoreError::InvalidExpression {
                model: M::MODEL_NAME,
                error,
            })?;
        Ok(Self { store, permissions })
    }

    /// The wrapped store.
    pub fn into_inner(self) -> S {
        self.store
    }

    #[must_use]
    pub const fn permissions(&self) -> &ModelPermissions<M> {
        &self.permissions
    }

    fn mask(&self, record: M, operation: &'static str) -> Result<M, StoreError> {
        self.permissions
            .mask_record(record)
            .ok_or(StoreError::Corrupt {
                model: M::MODEL_NAME,
                operation,
            })
    }

    fn mask_change(
        &self,
        change: EntryChange<M>,
        operation: &'static str,
    ) -> Result<EntryChange<M>, StoreError> {
        Ok(EntryChange {
            before: self.mask(change.before, operation)?,
            after: self.mask(change.after, operation)?,
        })
    }
}

impl<M: Model, S: Storage<M>> Storage<M> for SecuredStore<M, S> {
    fn find(
        &self,
        condition: &Condition,
        order: &[Sort],
        skip: usize,
        limit: Option<usize>,
    ) -> Result<Vec<M>, StoreError> {
        let effective = self.permissions.read_filter(condition);
        let records = self.store.find(&effective, order, skip, limit)?;
        records
            .into_iter()
            .map(|record| self.mask(record, "find"))
            .collect()
    }

    fn count(&self, condition: &Condition) -> Result<u64, StoreError> {
        self.store.count(&self.permissions.read_filter(condition))
    }

    /// Records the interceptor rewrites out of shape or the create rule
    /// rejects are silently dropped; the stored remainder is returned.
    fn insert(&mut self, records: Vec<M>) -> Result<Vec<M>, StoreError> {
        let admitted = records
            .into_iter()
            .filter_map(|record| self.permissions.admit_create(record))
            .collect();
        self.store.insert(admitted)
    }

    fn update_one(
        &mut self,
        condition: &Condition,
        modification: &Modification,
    ) -> Result<Option<EntryChange<M>>, StoreError> {
        let effective = self.permissions.write_filter(condition, modification);
        let change = self.store.update_one(&effective, modification)?;
        change
            .map(|change| self.mask_change(change, "update_one"))
            .transpose()
    }

    fn update_many(
        &mut self,
        condition: &Condition,
        modification: &Modification,
    ) -> Result<Vec<EntryChange<M>>, StoreError> {
        let effective = self.permissions.write_filter(condition, modification);
        let changes = self.store.update_many(&effective, modification)?;
        changes
            .into_iter()
            .map(|change| self.mask_change(change, "update_many"))
            .collect()
    }

    fn delete_one(&mut self, condition: &Condition) -> Result<Option<M>, StoreError> {
        let effective = self.permissions.delete_filter(condition);
        let removed = self.store.delete_one(&effective)?;
        removed
            .map(|record| self.mask(record, "delete_one"))
            .transpose()
    }

    fn delete_many(&mut self, condition: &Condition) -> Result<u64, StoreError> {
        self.store
            .delete_many(&self.permissions.delete_filter(condition))
    }
}

///
/// TESTS
///
