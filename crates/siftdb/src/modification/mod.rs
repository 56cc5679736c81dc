mod apply;
mod simplify;

#[cfg(test)]
mod tests;

use crate::{condition::Condition, path::FieldPath, value::Value};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// Modification
///
/// Pure, serializable transformation of a value tree. Leafs rewrite the
/// current focus value; `OnField` moves the focus, `Chain` sequences steps
/// left to right. A step that does not apply (wrong focus type, unresolved
/// path) leaves the value unchanged rather than failing, so `apply` is total.
///
/// Numeric steps operate within one numeric family and saturate at the
/// family bounds instead of wrapping or overflowing.
///
/// Variant names are the wire tags and are frozen.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Modification {
    /// Replace the focus with a literal.
    Assign(Value),
    /// Apply steps in order, each seeing the previous output.
    Chain(Vec<Self>),

    /// Saturating addition within the focus value's numeric family.
    Increment(Value),
    /// Saturating multiplication within the focus value's numeric family.
    Multiply(Value),
    /// Clamp the focus down to a bound when it compares greater.
    CoerceAtMost(Value),
    /// Clamp the focus up to a bound when it compares less.
    CoerceAtLeast(Value),

    AppendString(String),

    ListAppend(Vec<Value>),
    /// Drop the elements matching a condition.
    ListRemoveMatching(Condition),
    /// Drop the elements structurally equal to any listed value.
    ListRemoveAll(Vec<Value>),
    ListDropFirst,
    ListDropLast,
    /// Rewrite every element in place.
    ListPerElement(Box<Self>),

    /// Insert or overwrite entries.
    MapPutAll(BTreeMap<String, Value>),
    /// Rewrite the values of existing keys; absent keys are skipped.
    MapModifyByKey(BTreeMap<String, Self>),
    MapRemoveKeys(Vec<String>),

    OnField {
        path: FieldPath,
        modification: Box<Self>,
    },
}

impl Modification {
    /// The neutral modification.
    #[must_use]
    pub const fn identity() -> Self {
        Self::Chain(Vec::new())
    }

    #[must_use]
    pub fn is_identity(&self) -> bool {
        matches!(self, Self::Chain(steps) if steps.is_empty())
    }

    #[must_use]
    pub fn assign(value: impl Into<Value>) -> Self {
        Self::Assign(value.into())
    }

    #[must_use]
    pub const fn chain(steps: Vec<Self>) -> Self {
        Self::Chain(steps)
    }

    #[must_use]
    pub fn increment(amount: impl Into<Value>) -> Self {
        Self::Increment(amount.into())
    }

    #[must_use]
    pub fn multiply(factor: impl Into<Value>) -> Self {
        Self::Multiply(factor.into())
    }

    #[must_use]
    pub fn coerce_at_most(bound: impl Into<Value>) -> Self {
        Self::CoerceAtMost(bound.into())
    }

    #[must_use]
    pub fn coerce_at_least(bound: impl Into<Value>) -> Self {
        Self::CoerceAtLeast(bound.into())
    }

    #[must_use]
    pub fn append_string(suffix: impl Into<String>) -> Self {
        Self::AppendString(suffix.into())
    }

    #[must_use]
    pub fn list_append<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::ListAppend(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub const fn list_remove_matching(condition: Condition) -> Self {
        Self::ListRemoveMatching(condition)
    }

    #[must_use]
    pub fn list_remove_all<V: Into<Value>>(items: impl IntoIterator<Item = V>) -> Self {
        Self::ListRemoveAll(items.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn list_per_element(each: Self) -> Self {
        Self::ListPerElement(Box::new(each))
    }

    #[must_use]
    pub fn map_put_all<K: Into<String>, V: Into<Value>>(
        entries: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self::MapPutAll(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    #[must_use]
    pub fn map_modify_by_key<K: Into<String>>(
        entries: impl IntoIterator<Item = (K, Self)>,
    ) -> Self {
        Self::MapModifyByKey(
            entries
                .into_iter()
                .map(|(key, step)| (key.into(), step))
                .collect(),
        )
    }

    #[must_use]
    pub fn map_remove_keys<K: Into<String>>(keys: impl IntoIterator<Item = K>) -> Self {
        Self::MapRemoveKeys(keys.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn on_field(path: FieldPath, modification: Self) -> Self {
        Self::OnField {
            path,
            modification: Box::new(modification),
        }
    }

    /// Sequence `next` after this modification.
    #[must_use]
    pub fn then(self, next: Self) -> Self {
        match self {
            Self::Chain(mut steps) => {
                steps.push(next);
                Self::Chain(steps)
            }
            head => Self::Chain(vec![head, next]),
        }
    }

    /// The field paths whose subtrees this modification may rewrite.
    ///
    /// A bare leaf at the root touches the root path, which overlaps every
    /// field. The identity chain touches nothing.
    #[must_use]
    pub fn touched_paths(&self) -> Vec<FieldPath> {
        let mut paths = Vec::new();
        self.collect_touched(&FieldPath::root(), &mut paths);
        paths
    }

    fn collect_touched(&self, prefix: &FieldPath, out: &mut Vec<FieldPath>) {
        match self {
            Self::Chain(steps) => {
                for step in steps {
                    step.collect_touched(prefix, out);
                }
            }
            Self::OnField { path, modification } => {
                modification.collect_touched(&prefix.join(path), out);
            }
            _ => {
                if !out.contains(prefix) {
                    out.push(prefix.clone());
                }
            }
        }
    }
}
