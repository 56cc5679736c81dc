use crate::{
    modification::Modification,
    path::PathSegment,
    traits::FieldValue,
    value::{Float64, Value, strict_order_cmp},
};
use std::cmp::Ordering;

impl Modification {
    ///
    /// Apply to a single value.
    ///
    /// Total, pure, and terminating: a step that does not fit the focus
    /// (wrong type, unresolved path, missing key) leaves the value as it
    /// was. Wire input should still be validated up front so that type
    /// mistakes surface to the caller instead of silently doing nothing.
    ///
    #[must_use]
    pub fn apply_value(&self, value: Value) -> Value {
        match self {
            Self::Assign(literal) => literal.clone(),
            Self::Chain(steps) => steps
                .iter()
                .fold(value, |current, step| step.apply_value(current)),

            Self::Increment(amount) => numeric_step(
                value,
                amount,
                i64::saturating_add,
                u64::saturating_add,
                |a, b| a + b,
            ),
            Self::Multiply(factor) => numeric_step(
                value,
                factor,
                i64::saturating_mul,
                u64::saturating_mul,
                |a, b| a * b,
            ),

            Self::CoerceAtMost(bound) => {
                if strict_order_cmp(&value, bound) == Some(Ordering::Greater) {
                    bound.clone()
                } else {
                    value
                }
            }
            Self::CoerceAtLeast(bound) => {
                if strict_order_cmp(&value, bound) == Some(Ordering::Less) {
                    bound.clone()
                } else {
                    value
                }
            }

            Self::AppendString(suffix) => match value {
                Value::Text(mut text) => {
                    text.push_str(suffix);
                    Value::Text(text)
                }
                other => other,
            },

            Self::ListAppend(additions) => match value {
                Value::List(mut items) => {
                    items.extend(additions.iter().cloned());
                    Value::List(items)
                }
                other => other,
            },
            Self::ListRemoveMatching(condition) => match value {
                Value::List(mut items) => {
                    items.retain(|item| !condition.matches_value(item));
                    Value::List(items)
                }
                other => other,
            },
            Self::ListRemoveAll(targets) => match value {
                Value::List(mut items) => {
                    items.retain(|item| !targets.contains(item));
                    Value::List(items)
                }
                other => other,
            },
            Self::ListDropFirst => match value {
                Value::List(mut items) => {
                    if !items.is_empty() {
                        items.remove(0);
                    }
                    Value::List(items)
                }
                other => other,
            },
            Self::ListDropLast => match value {
                Value::List(mut items) => {
                    items.pop();
                    Value::List(items)
                }
                other => other,
            },
            Self::ListPerElement(each) => match value {
                Value::List(items) => Value::List(
                    items
                        .into_iter()
                        .map(|item| each.apply_value(item))
                        .collect(),
                ),
                other => other,
            },

            Self::MapPutAll(additions) => match value {
                Value::Map(mut entries) => {
                    entries.extend(
                        additions
                            .iter()
                            .map(|(key, entry)| (key.clone(), entry.clone())),
                    );
                    Value::Map(entries)
                }
                other => other,
            },
            Self::MapModifyByKey(steps) => match value {
                Value::Map(mut entries) => {
                    for (key, step) in steps {
                        if let Some(slot) = entries.get_mut(key) {
                            let current = std::mem::replace(slot, Value::Null);
                            *slot = step.apply_value(current);
                        }
                    }
                    Value::Map(entries)
                }
                other => other,
            },
            Self::MapRemoveKeys(keys) => match value {
                Value::Map(mut entries) => {
                    for key in keys {
                        entries.remove(key);
                    }
                    Value::Map(entries)
                }
                other => other,
            },

            Self::OnField { path, modification } => {
                apply_at(value, path.segments(), modification)
            }
        }
    }

    /// Apply to a typed record.
    ///
    /// Returns `None` when the modified value no longer fits the record
    /// type, which validated input cannot produce.
    #[must_use]
    pub fn apply<M: FieldValue>(&self, record: &M) -> Option<M> {
        M::from_value(&self.apply_value(record.to_value()))
    }
}

/// Walk into a map tree and rewrite the focus at the end of the path.
///
/// Missing keys, non-map intermediates, and unwrapped nulls stop the walk;
/// fields are never created.
fn apply_at(value: Value, segments: &[PathSegment], modification: &Modification) -> Value {
    let Some((head, rest)) = segments.split_first() else {
        return modification.apply_value(value);
    };

    match value {
        Value::Map(mut entries) => {
            if let Some(child) = entries.get_mut(&head.name)
                && !(head.unwrap && child.is_null())
            {
                let current = std::mem::replace(child, Value::Null);
                *child = apply_at(current, rest, modification);
            }
            Value::Map(entries)
        }
        other => other,
    }
}

/// Arithmetic stays within one numeric family and saturates at its bounds.
fn numeric_step(
    value: Value,
    operand: &Value,
    int_op: fn(i64, i64) -> i64,
    uint_op: fn(u64, u64) -> u64,
    float_op: fn(f64, f64) -> f64,
) -> Value {
    match (value, operand) {
        (Value::Int(current), Value::Int(amount)) => Value::Int(int_op(current, *amount)),
        (Value::Uint(current), Value::Uint(amount)) => Value::Uint(uint_op(current, *amount)),
        (Value::Float(current), Value::Float(amount)) => {
            Value::Float(Float64::saturating(float_op(current.get(), amount.get())))
        }
        (other, _) => other,
    }
}
