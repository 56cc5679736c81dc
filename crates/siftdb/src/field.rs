use crate::{
    condition::Condition,
    modification::Modification,
    path::FieldPath,
    store::{Direction, Sort},
    traits::{FieldValue, Integer, Numeric, Ordered},
    value::Value,
};
use std::{collections::BTreeMap, fmt, marker::PhantomData};

///
/// Field
///
/// A typed handle on one model field, carrying the model and value types
/// as phantoms. Handles come from the accessor struct `#[derive(Model)]`
/// generates; the builders below produce conditions and modifications that
/// are well typed by construction, so schema validation cannot reject
/// them.
///

pub struct Field<M, V> {
    path: FieldPath,
    _marker: PhantomData<fn(&M) -> V>,
}

impl<M, V> Field<M, V> {
    /// Handle on the field at `path`.
    #[must_use]
    pub const fn new(path: FieldPath) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    /// The addressed path.
    #[must_use]
    pub const fn path(&self) -> &FieldPath {
        &self.path
    }

    /// Scope a condition to this field.
    #[must_use]
    pub fn filter(&self, condition: Condition) -> Condition {
        Condition::on_field(self.path.clone(), condition)
    }

    /// Scope a modification to this field.
    #[must_use]
    pub fn modify(&self, modification: Modification) -> Modification {
        Modification::on_field(self.path.clone(), modification)
    }

    /// Sort ascending by this field.
    #[must_use]
    pub fn ascending(&self) -> Sort {
        Sort {
            path: self.path.clone(),
            direction: Direction::Ascending,
        }
    }

    /// Sort descending by this field.
    #[must_use]
    pub fn descending(&self) -> Sort {
        Sort {
            path: self.path.clone(),
            direction: Direction::Descending,
        }
    }
}

impl<M, V: FieldValue> Field<M, V> {
    #[must_use]
    pub fn equal(&self, value: impl Into<V>) -> Condition {
        self.filter(Condition::Equal(value.into().to_value()))
    }

    #[must_use]
    pub fn not_equal(&self, value: impl Into<V>) -> Condition {
        self.filter(Condition::NotEqual(value.into().to_value()))
    }

    #[must_use]
    pub fn inside<I: Into<V>>(&self, values: impl IntoIterator<Item = I>) -> Condition {
        let values = values
            .into_iter()
            .map(|value| value.into().to_value())
            .collect();
        self.filter(Condition::Inside(values))
    }

    #[must_use]
    pub fn not_inside<I: Into<V>>(&self, values: impl IntoIterator<Item = I>) -> Condition {
        let values = values
            .into_iter()
            .map(|value| value.into().to_value())
            .collect();
        self.filter(Condition::NotInside(values))
    }

    #[must_use]
    pub fn assign(&self, value: impl Into<V>) -> Modification {
        self.modify(Modification::Assign(value.into().to_value()))
    }
}

impl<M, V: Ordered> Field<M, V> {
    #[must_use]
    pub fn greater_than(&self, value: impl Into<V>) -> Condition {
        self.filter(Condition::GreaterThan(value.into().to_value()))
    }

    #[must_use]
    pub fn less_than(&self, value: impl Into<V>) -> Condition {
        self.filter(Condition::LessThan(value.into().to_value()))
    }

    #[must_use]
    pub fn greater_or_equal(&self, value: impl Into<V>) -> Condition {
        self.filter(Condition::GreaterOrEqual(value.into().to_value()))
    }

    #[must_use]
    pub fn less_or_equal(&self, value: impl Into<V>) -> Condition {
        self.filter(Condition::LessOrEqual(value.into().to_value()))
    }

    #[must_use]
    pub fn coerce_at_most(&self, bound: impl Into<V>) -> Modification {
        self.modify(Modification::CoerceAtMost(bound.into().to_value()))
    }

    #[must_use]
    pub fn coerce_at_least(&self, bound: impl Into<V>) -> Modification {
        self.modify(Modification::CoerceAtLeast(bound.into().to_value()))
    }
}

impl<M, V: Numeric> Field<M, V> {
    /// Saturating add of `amount`.
    #[must_use]
    pub fn increment(&self, amount: impl Into<V>) -> Modification {
        self.modify(Modification::Increment(amount.into().to_value()))
    }

    /// Saturating multiply by `amount`.
    #[must_use]
    pub fn multiply(&self, amount: impl Into<V>) -> Modification {
        self.modify(Modification::Multiply(amount.into().to_value()))
    }
}

impl<M, V: Integer> Field<M, V> {
    #[must_use]
    pub fn all_set(&self, mask: u64) -> Condition {
        self.filter(Condition::AllSet(mask))
    }

    #[must_use]
    pub fn all_clear(&self, mask: u64) -> Condition {
        self.filter(Condition::AllClear(mask))
    }

    #[must_use]
    pub fn any_set(&self, mask: u64) -> Condition {
        self.filter(Condition::AnySet(mask))
    }

    #[must_use]
    pub fn any_clear(&self, mask: u64) -> Condition {
        self.filter(Condition::AnyClear(mask))
    }
}

impl<M> Field<M, String> {
    #[must_use]
    pub fn contains(&self, substring: impl Into<String>) -> Condition {
        self.filter(Condition::contains(substring))
    }

    #[must_use]
    pub fn contains_ci(&self, substring: impl Into<String>) -> Condition {
        self.filter(Condition::contains_ci(substring))
    }

    #[must_use]
    pub fn append(&self, suffix: impl Into<String>) -> Modification {
        self.modify(Modification::AppendString(suffix.into()))
    }
}

impl<M, E: FieldValue> Field<M, Vec<E>> {
    #[must_use]
    pub fn all_elements(&self, condition: Condition) -> Condition {
        self.filter(Condition::all_elements(condition))
    }

    #[must_use]
    pub fn any_element(&self, condition: Condition) -> Condition {
        self.filter(Condition::any_element(condition))
    }

    #[must_use]
    pub fn sizes_equals(&self, size: u64) -> Condition {
        self.filter(Condition::SizesEquals(size))
    }

    #[must_use]
    pub fn append<I: Into<E>>(&self, items: impl IntoIterator<Item = I>) -> Modification {
        let items = items
            .into_iter()
            .map(|item| item.into().to_value())
            .collect();
        self.modify(Modification::ListAppend(items))
    }

    #[must_use]
    pub fn remove_matching(&self, condition: Condition) -> Modification {
        self.modify(Modification::ListRemoveMatching(condition))
    }

    #[must_use]
    pub fn remove_all<I: Into<E>>(&self, items: impl IntoIterator<Item = I>) -> Modification {
        let items = items
            .into_iter()
            .map(|item| item.into().to_value())
            .collect();
        self.modify(Modification::ListRemoveAll(items))
    }

    #[must_use]
    pub fn drop_first(&self) -> Modification {
        self.modify(Modification::ListDropFirst)
    }

    #[must_use]
    pub fn drop_last(&self) -> Modification {
        self.modify(Modification::ListDropLast)
    }

    /// Apply `step` to every element.
    #[must_use]
    pub fn per_element(&self, step: Modification) -> Modification {
        self.modify(Modification::list_per_element(step))
    }
}

impl<M, E: FieldValue> Field<M, BTreeMap<String, E>> {
    #[must_use]
    pub fn contains_key(&self, key: impl Into<String>) -> Condition {
        self.filter(Condition::ContainsKey(key.into()))
    }

    #[must_use]
    pub fn sizes_equals(&self, size: u64) -> Condition {
        self.filter(Condition::SizesEquals(size))
    }

    #[must_use]
    pub fn put_all<K: Into<String>, I: Into<E>>(
        &self,
        entries: impl IntoIterator<Item = (K, I)>,
    ) -> Modification {
        let entries = entries
            .into_iter()
            .map(|(key, entry)| (key.into(), entry.into().to_value()))
            .collect();
        self.modify(Modification::MapPutAll(entries))
    }

    #[must_use]
    pub fn modify_by_key<K: Into<String>>(
        &self,
        steps: impl IntoIterator<Item = (K, Modification)>,
    ) -> Modification {
        let steps = steps
            .into_iter()
            .map(|(key, step)| (key.into(), step))
            .collect();
        self.modify(Modification::MapModifyByKey(steps))
    }

    #[must_use]
    pub fn remove_keys<K: Into<String>>(&self, keys: impl IntoIterator<Item = K>) -> Modification {
        let keys = keys.into_iter().map(Into::into).collect();
        self.modify(Modification::MapRemoveKeys(keys))
    }
}

impl<M, V: FieldValue> Field<M, Option<V>> {
    /// Handle on the unwrapped value. Conditions built from it skip unset
    /// records, modifications leave them unchanged.
    #[must_use]
    pub fn some(&self) -> Field<M, V> {
        Field::new(self.path.some())
    }

    #[must_use]
    pub fn is_null(&self) -> Condition {
        self.filter(Condition::Equal(Value::Null))
    }

    #[must_use]
    pub fn is_some(&self) -> Condition {
        self.filter(Condition::NotEqual(Value::Null))
    }
}

impl<M, V> Clone for Field<M, V> {
    fn clone(&self) -> Self {
        Self::new(self.path.clone())
    }
}

impl<M, V> fmt::Debug for Field<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Field").field(&self.path).finish()
    }
}

impl<M, V> fmt::Display for Field<M, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path)
    }
}

///
/// TESTS
///
