mod validate;

pub use validate::{
    ValidateError, validate_condition, validate_modification, validate_order, validate_path,
};

use std::fmt;

///
/// FieldType
///
/// Runtime description of a model field's type. Built once per model by
/// `#[derive(Model)]` from the `FieldValue::field_type` of each field.
/// `Struct` holds a getter rather than the schema itself so that nested
/// models do not recurse while their statics initialize.
///

#[derive(Clone, Debug)]
pub enum FieldType {
    Bool,
    Int,
    Uint,
    Float,
    Text,
    Bytes,
    Option(Box<FieldType>),
    List(Box<FieldType>),
    Map(Box<FieldType>),
    Struct(fn() -> &'static ModelSchema),
}

impl FieldType {
    /// Types with a defined ordering, usable with comparison operators
    /// and sort keys.
    #[must_use]
    pub const fn is_orderable(&self) -> bool {
        matches!(
            self,
            Self::Bool | Self::Int | Self::Uint | Self::Float | Self::Text | Self::Bytes
        )
    }

    /// Types whose values carry flag bits.
    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(self, Self::Int | Self::Uint)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => write!(f, "Bool"),
            Self::Int => write!(f, "Int"),
            Self::Uint => write!(f, "Uint"),
            Self::Float => write!(f, "Float"),
            Self::Text => write!(f, "Text"),
            Self::Bytes => write!(f, "Bytes"),
            Self::Option(inner) => write!(f, "Option<{inner}>"),
            Self::List(inner) => write!(f, "List<{inner}>"),
            Self::Map(inner) => write!(f, "Map<{inner}>"),
            Self::Struct(fields) => write!(f, "{}", fields().name),
        }
    }
}

///
/// FieldSchema
///

#[derive(Clone, Debug)]
pub struct FieldSchema {
    pub name: &'static str,
    pub ty: FieldType,
}

///
/// ModelSchema
///
/// The named field layout of one model.
///

#[derive(Clone, Debug)]
pub struct ModelSchema {
    pub name: &'static str,
    pub fields: Vec<FieldSchema>,
}

impl ModelSchema {
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|field| field.name == name)
    }
}
