use crate::{
    condition::Condition,
    path::PathSegment,
    traits::{FieldValue, FieldValues},
    value::{TextMode, Value, strict_order_cmp},
};
use std::cmp::Ordering;

/// Walk a value tree along path segments.
///
/// Returns `None` (unresolved) when a step addresses a missing key, a
/// non-map value, or unwraps a null. Callers treat unresolved as a
/// non-match for conditions and a no-op for modifications.
pub(crate) fn resolve<'a>(value: &'a Value, segments: &[PathSegment]) -> Option<&'a Value> {
    let Some((head, rest)) = segments.split_first() else {
        return Some(value);
    };

    let Value::Map(entries) = value else {
        return None;
    };
    let child = entries.get(&head.name)?;

    if head.unwrap && child.is_null() {
        return None;
    }

    resolve(child, rest)
}

impl Condition {
    ///
    /// Evaluate against a single value.
    ///
    /// Total, pure, and terminating: an ill-typed comparison is a non-match,
    /// never an error. Wire input should still be validated up front so that
    /// type mistakes surface to the caller instead of silently matching
    /// nothing.
    ///
    #[must_use]
    pub fn matches_value(&self, value: &Value) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,

            Self::And(children) => children.iter().all(|child| child.matches_value(value)),
            Self::Or(children) => children.iter().any(|child| child.matches_value(value)),
            Self::Not(inner) => !inner.matches_value(value),

            Self::Equal(target) => value == target,
            Self::NotEqual(target) => value != target,

            Self::GreaterThan(target) => {
                strict_order_cmp(value, target).is_some_and(Ordering::is_gt)
            }
            Self::LessThan(target) => strict_order_cmp(value, target).is_some_and(Ordering::is_lt),
            Self::GreaterOrEqual(target) => {
                strict_order_cmp(value, target).is_some_and(Ordering::is_ge)
            }
            Self::LessOrEqual(target) => {
                strict_order_cmp(value, target).is_some_and(Ordering::is_le)
            }

            Self::Inside(values) => values.contains(value),
            Self::NotInside(values) => !values.contains(value),

            Self::StringContains {
                substring,
                ignore_case,
            } => {
                let mode = if *ignore_case {
                    TextMode::Ci
                } else {
                    TextMode::Cs
                };
                // NOTE: non-text focus values are non-matches.
                value.text_contains(substring, mode).unwrap_or(false)
            }

            Self::AllClear(mask) => value.flag_bits().is_some_and(|bits| bits & mask == 0),
            Self::AllSet(mask) => value.flag_bits().is_some_and(|bits| bits & mask == *mask),
            Self::AnyClear(mask) => value.flag_bits().is_some_and(|bits| bits & mask != *mask),
            Self::AnySet(mask) => value.flag_bits().is_some_and(|bits| bits & mask != 0),

            Self::AllElements(inner) => value
                .as_list()
                .is_some_and(|items| items.iter().all(|item| inner.matches_value(item))),
            Self::AnyElement(inner) => value
                .as_list()
                .is_some_and(|items| items.iter().any(|item| inner.matches_value(item))),

            Self::SizesEquals(n) => match value {
                Value::List(items) => items.len() as u64 == *n,
                Value::Map(entries) => entries.len() as u64 == *n,
                _ => false,
            },

            Self::ContainsKey(key) => value
                .as_map()
                .is_some_and(|entries| entries.contains_key(key)),

            Self::OnField { path, condition } => resolve(value, path.segments())
                .is_some_and(|focus| condition.matches_value(focus)),
        }
    }

    ///
    /// Evaluate against a typed record.
    ///
    /// Root-level `OnField` nodes read single fields through [`FieldValues`]
    /// instead of materializing the whole record; bare root leaves fall back
    /// to the full map form.
    ///
    #[must_use]
    pub fn evaluate<R: FieldValue + FieldValues>(&self, record: &R) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,

            Self::And(children) => children.iter().all(|child| child.evaluate(record)),
            Self::Or(children) => children.iter().any(|child| child.evaluate(record)),
            Self::Not(inner) => !inner.evaluate(record),

            Self::OnField { path, condition } => {
                let Some((head, rest)) = path.segments().split_first() else {
                    return condition.matches_value(&record.to_value());
                };

                let Some(value) = record.get_value(&head.name) else {
                    return false;
                };
                if head.unwrap && value.is_null() {
                    return false;
                }

                resolve(&value, rest).is_some_and(|focus| condition.matches_value(focus))
            }

            leaf => leaf.matches_value(&record.to_value()),
        }
    }
}
