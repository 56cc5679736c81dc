use crate::{
    schema::{FieldType, ModelSchema},
    value::{Bytes, Float64, Value},
};
use serde::{Serialize, de::DeserializeOwned};
use std::{collections::BTreeMap, fmt::Debug};

///
/// FieldValue
///
/// Conversion between a typed field and its wire value, plus the field's
/// schema type. Implemented here for every leaf type a model field may
/// carry; `#[derive(Model)]` implements it for nested records.
///
/// Integer leaves are exactly the wire widths, `i64` and `u64`: a checked
/// arithmetic step saturates at the field's own bounds, so decoding a
/// family match never fails.
///

pub trait FieldValue: Sized {
    /// Schema type of this field.
    fn field_type() -> FieldType;

    /// The field as a wire value.
    fn to_value(&self) -> Value;

    /// Read the field back from a wire value; `None` on a type mismatch.
    fn from_value(value: &Value) -> Option<Self>;
}

///
/// FieldValues
///
/// Per-field access to a record's wire values, keyed by field name.
///

pub trait FieldValues {
    fn get_value(&self, field: &str) -> Option<Value>;
}

/// Marker for field types with a defined ordering, usable with comparison
/// operators, coercions and sort keys.
pub trait Ordered: FieldValue {}

/// Marker for numeric field types, usable with arithmetic steps.
pub trait Numeric: Ordered {}

/// Marker for integer field types, usable with bit tests.
pub trait Integer: Numeric {}

///
/// Model
///
/// A typed record: schema metadata plus wire conversion, with typed field
/// accessors generated by `#[derive(Model)]`.
///

pub trait Model:
    Clone + Debug + PartialEq + FieldValue + FieldValues + Serialize + DeserializeOwned
{
    const MODEL_NAME: &'static str;

    /// Schema describing this model's fields.
    fn schema() -> &'static ModelSchema;
}

impl FieldValue for bool {
    fn field_type() -> FieldType {
        FieldType::Bool
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for i64 {
    fn field_type() -> FieldType {
        FieldType::Int
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for u64 {
    fn field_type() -> FieldType {
        FieldType::Uint
    }

    fn to_value(&self) -> Value {
        Value::Uint(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Uint(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for Float64 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Float(v) => Some(*v),
            _ => None,
        }
    }
}

impl FieldValue for String {
    fn field_type() -> FieldType {
        FieldType::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Text(v) => Some(v.clone()),
            _ => None,
        }
    }
}

impl FieldValue for Bytes {
    fn field_type() -> FieldType {
        FieldType::Bytes
    }

    fn to_value(&self) -> Value {
        Value::Bytes(self.to_vec())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bytes(raw) => Some(Self::new(raw.clone())),
            _ => None,
        }
    }
}

impl<V: FieldValue> FieldValue for Option<V> {
    fn field_type() -> FieldType {
        FieldType::Option(Box::new(V::field_type()))
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(None),
            other => V::from_value(other).map(Some),
        }
    }
}

impl<V: FieldValue> FieldValue for Vec<V> {
    fn field_type() -> FieldType {
        FieldType::List(Box::new(V::field_type()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::List(items) => items.iter().map(V::from_value).collect(),
            _ => None,
        }
    }
}

impl<V: FieldValue> FieldValue for BTreeMap<String, V> {
    fn field_type() -> FieldType {
        FieldType::Map(Box::new(V::field_type()))
    }

    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, entry)| (key.clone(), entry.to_value()))
                .collect(),
        )
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Map(entries) => entries
                .iter()
                .map(|(key, entry)| V::from_value(entry).map(|entry| (key.clone(), entry)))
                .collect(),
            _ => None,
        }
    }
}

impl Ordered for bool {}
impl Ordered for i64 {}
impl Ordered for u64 {}
impl Ordered for Float64 {}
impl Ordered for String {}
impl Ordered for Bytes {}

impl Numeric for i64 {}
impl Numeric for u64 {}
impl Numeric for Float64 {}

impl Integer for i64 {}
impl Integer for u64 {}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_families_do_not_cross() {
        assert_eq!(3_i64.to_value(), Value::Int(3));
        assert_eq!(i64::from_value(&Value::Int(-3)), Some(-3));
        assert_eq!(i64::from_value(&Value::Uint(3)), None);
        assert_eq!(u64::from_value(&Value::Uint(3)), Some(3));
        assert_eq!(u64::from_value(&Value::Int(3)), None);
    }

    #[test]
    fn options_map_to_null() {
        let unset: Option<String> = None;
        assert_eq!(unset.to_value(), Value::Null);
        assert_eq!(Option::<String>::from_value(&Value::Null), Some(None));
        assert_eq!(
            Option::<String>::from_value(&Value::Text("x".into())),
            Some(Some("x".to_string()))
        );
        assert_eq!(Option::<String>::from_value(&Value::Int(1)), None);
    }

    #[test]
    fn collections_convert_elementwise() {
        let tags = vec!["a".to_string(), "b".to_string()];
        let wire = tags.to_value();
        assert_eq!(
            wire,
            Value::List(vec![Value::Text("a".into()), Value::Text("b".into())])
        );
        assert_eq!(Vec::<String>::from_value(&wire), Some(tags));
        assert_eq!(
            Vec::<String>::from_value(&Value::List(vec![Value::Int(1)])),
            None
        );

        let attrs = BTreeMap::from([("k".to_string(), 5_i64)]);
        let wire = attrs.to_value();
        assert_eq!(BTreeMap::<String, i64>::from_value(&wire), Some(attrs));
    }

    #[test]
    fn field_types_describe_nesting() {
        assert_eq!(
            Option::<Vec<u64>>::field_type().to_string(),
            "Option<List<Uint>>"
        );
        assert_eq!(
            BTreeMap::<String, Float64>::field_type().to_string(),
            "Map<Float>"
        );
    }
}
