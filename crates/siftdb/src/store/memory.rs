use crate::{
    condition::{Condition, eval::resolve},
    modification::Modification,
    schema::{validate_condition, validate_modification, validate_order},
    store::{Direction, EntryChange, Sort, Storage, StoreError},
    traits::{FieldValue, Model},
    value::{Value, canonical_cmp},
};
use std::cmp::Ordering;

///
/// MemoryStore
///
/// Insertion-ordered reference store. Every inbound expression is checked
/// against the model schema, then the direct interpreter runs it; backend
/// adapters are tested against this store's answers.
///

#[derive(Clone, Debug)]
pub struct MemoryStore<M> {
    records: Vec<M>,
}

impl<M> MemoryStore<M> {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(&self) -> &[M] {
        &self.records
    }
}

impl<M> Default for MemoryStore<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: Model> MemoryStore<M> {
    fn checked_condition(condition: &Condition) -> Result<(), StoreError> {
        validate_condition(M::schema(), condition).map_err(|error| {
            StoreError::InvalidExpression {
                model: M::MODEL_NAME,
                error,
            }
        })
    }

    fn checked_modification(modification: &Modification) -> Result<(), StoreError> {
        validate_modification(M::schema(), modification).map_err(|error| {
            StoreError::InvalidExpression {
                model: M::MODEL_NAME,
                error,
            }
        })
    }

    fn checked_order(order: &[Sort]) -> Result<(), StoreError> {
        order.iter().try_for_each(|sort| {
            validate_order(M::schema(), &sort.path).map_err(|error| {
                StoreError::InvalidExpression {
                    model: M::MODEL_NAME,
                    error,
                }
            })
        })
    }

    fn apply_to(
        record: &M,
        modification: &Modification,
        operation: &'static str,
    ) -> Result<M, StoreError> {
        modification.apply(record).ok_or(StoreError::Corrupt {
            model: M::MODEL_NAME,
            operation,
        })
    }
}

fn sort_keys<M: FieldValue>(record: &M, order: &[Sort]) -> Vec<Value> {
    let value = record.to_value();
    order
        .iter()
        .map(|sort| {
            resolve(&value, sort.path.segments())
                .cloned()
                .unwrap_or(Value::Null)
        })
        .collect()
}

fn compare_keys(order: &[Sort], left: &[Value], right: &[Value]) -> Ordering {
    for (sort, (a, b)) in order.iter().zip(left.iter().zip(right)) {
        let ordering = match sort.direction {
            Direction::Ascending => canonical_cmp(a, b),
            Direction::Descending => canonical_cmp(a, b).reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

impl<M: Model> Storage<M> for MemoryStore<M> {
    fn find(
        &self,
        condition: &Condition,
        order: &[Sort],
        skip: usize,
        limit: Option<usize>,
    ) -> Result<Vec<M>, StoreError> {
        Self::checked_condition(condition)?;
        Self::checked_order(order)?;

        let mut matches: Vec<(Vec<Value>, M)> = self
            .records
            .iter()
            .filter(|record| condition.evaluate(*record))
            .map(|record| (sort_keys(record, order), record.clone()))
            .collect();
        if !order.is_empty() {
            // stable, so ties keep insertion order
            matches.sort_by(|(left, _), (right, _)| compare_keys(order, left, right));
        }

        Ok(matches
            .into_iter()
            .map(|(_, record)| record)
            .skip(skip)
            .take(limit.unwrap_or(usize::MAX))
            .collect())
    }

    fn count(&self, condition: &Condition) -> Result<u64, StoreError> {
        Self::checked_condition(condition)?;
        let count = self
            .records
            .iter()
            .filter(|record| condition.evaluate(*record))
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }

    fn insert(&mut self, records: Vec<M>) -> Result<Vec<M>, StoreError> {
        self.records.extend(records.iter().cloned());
        Ok(records)
    }

    fn update_one(
        &mut self,
        condition: &Condition,
        modification: &Modification,
    ) -> Result<Option<EntryChange<M>>, StoreError> {
        Self::checked_condition(condition)?;
        Self::checked_modification(modification)?;

        for record in &mut self.records {
            if condition.evaluate(record) {
                let after = Self::apply_to(record, modification, "update_one")?;
                let before = std::mem::replace(record, after.clone());
                return Ok(Some(EntryChange { before, after }));
            }
        }
        Ok(None)
    }

    fn update_many(
        &mut self,
        condition: &Condition,
        modification: &Modification,
    ) -> Result<Vec<EntryChange<M>>, StoreError> {
        Self::checked_condition(condition)?;
        Self::checked_modification(modification)?;

        // apply to every match before touching the store, so a failed
        // application commits nothing
        let mut staged = Vec::new();
        for (index, record) in self.records.iter().enumerate() {
            if condition.evaluate(record) {
                let after = Self::apply_to(record, modification, "update_many")?;
                staged.push((index, after));
            }
        }

        let mut changes = Vec::with_capacity(staged.len());
        for (index, after) in staged {
            let before = std::mem::replace(&mut self.records[index], after.clone());
            changes.push(EntryChange { before, after });
        }
        Ok(changes)
    }

    fn delete_one(&mut self, condition: &Condition) -> Result<Option<M>, StoreError> {
        Self::checked_condition(condition)?;
        let index = self
            .records
            .iter()
            .position(|record| condition.evaluate(record));
        Ok(index.map(|index| self.records.remove(index)))
    }

    fn delete_many(&mut self, condition: &Condition) -> Result<u64, StoreError> {
        Self::checked_condition(condition)?;
        let before = self.records.len();
        self.records.retain(|record| !condition.evaluate(record));
        Ok(u64::try_from(before - self.records.len()).unwrap_or(u64::MAX))
    }
}

///
/// TESTS
///
