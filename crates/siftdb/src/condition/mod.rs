pub(crate) mod eval;
mod simplify;


use crate::{path::FieldPath, value::Value};
use serde::{Deserialize, Serialize};
use std::ops::{BitAnd, BitOr};

///
/// Condition
///
/// Pure, serializable predicate over a value tree. Leafs test the current
/// focus value; `OnField` moves the focus to a named (possibly nested,
/// possibly optional) field. An unresolved path makes the projected
/// sub-condition a non-match.
///
/// This layer carries no schema knowledge. Typed construction goes through
/// [`Field`](crate::field::Field); wire input is checked by
/// [`validate_condition`](crate::schema::validate_condition) before use.
///
/// Variant names are the wire tags and are frozen.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    /// Matches every value.
    Always,
    /// Matches nothing.
    Never,
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),

    /// Structural equality against a literal.
    Equal(Value),
    NotEqual(Value),
    /// Ordered comparisons; defined only within one orderable scalar
    /// variant, anything else is a non-match.
    GreaterThan(Value),
    LessThan(Value),
    GreaterOrEqual(Value),
    LessOrEqual(Value),
    /// Membership by structural equality.
    Inside(Vec<Value>),
    NotInside(Vec<Value>),

    StringContains {
        substring: String,
        #[serde(rename = "ignoreCase")]
        ignore_case: bool,
    },

    /// Bitmask tests against the two's-complement bits of an integer field.
    AllClear(u64),
    AllSet(u64),
    AnyClear(u64),
    AnySet(u64),

    /// Every element matches; vacuously true for the empty list.
    AllElements(Box<Self>),
    /// Some element matches; false for the empty list.
    AnyElement(Box<Self>),
    /// Element/entry count of a list or map.
    SizesEquals(u64),

    ContainsKey(String),

    OnField {
        path: FieldPath,
        condition: Box<Self>,
    },
}

impl Condition {
    #[must_use]
    pub const fn and(conditions: Vec<Self>) -> Self {
        Self::And(conditions)
    }

    #[must_use]
    pub const fn or(conditions: Vec<Self>) -> Self {
        Self::Or(conditions)
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(condition: Self) -> Self {
        Self::Not(Box::new(condition))
    }

    #[must_use]
    pub fn equal(value: impl Into<Value>) -> Self {
        Self::Equal(value.into())
    }

    #[must_use]
    pub fn not_equal(value: impl Into<Value>) -> Self {
        Self::NotEqual(value.into())
    }

    #[must_use]
    pub fn greater_than(value: impl Into<Value>) -> Self {
        Self::GreaterThan(value.into())
    }

    #[must_use]
    pub fn less_than(value: impl Into<Value>) -> Self {
        Self::LessThan(value.into())
    }

    #[must_use]
    pub fn greater_or_equal(value: impl Into<Value>) -> Self {
        Self::GreaterOrEqual(value.into())
    }

    #[must_use]
    pub fn less_or_equal(value: impl Into<Value>) -> Self {
        Self::LessOrEqual(value.into())
    }

    #[must_use]
    pub fn inside<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::Inside(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn not_inside<V: Into<Value>>(values: impl IntoIterator<Item = V>) -> Self {
        Self::NotInside(values.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn contains(substring: impl Into<String>) -> Self {
        Self::StringContains {
            substring: substring.into(),
            ignore_case: false,
        }
    }

    #[must_use]
    pub fn contains_ci(substring: impl Into<String>) -> Self {
        Self::StringContains {
            substring: substring.into(),
            ignore_case: true,
        }
    }

    #[must_use]
    pub fn all_elements(inner: Self) -> Self {
        Self::AllElements(Box::new(inner))
    }

    #[must_use]
    pub fn any_element(inner: Self) -> Self {
        Self::AnyElement(Box::new(inner))
    }

    #[must_use]
    pub fn contains_key(key: impl Into<String>) -> Self {
        Self::ContainsKey(key.into())
    }

    #[must_use]
    pub fn on_field(path: FieldPath, condition: Self) -> Self {
        Self::OnField {
            path,
            condition: Box::new(condition),
        }
    }
}

impl BitAnd for Condition {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitAnd for &Condition {
    type Output = Condition;

    fn bitand(self, rhs: Self) -> Self::Output {
        Condition::And(vec![self.clone(), rhs.clone()])
    }
}

impl BitOr for Condition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl BitOr for &Condition {
    type Output = Condition;

    fn bitor(self, rhs: Self) -> Self::Output {
        Condition::Or(vec![self.clone(), rhs.clone()])
    }
}
