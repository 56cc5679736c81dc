//! Schema checks for conditions, modifications and sort keys.
//!
//! Validation runs before a store touches an expression. Evaluation itself
//! is total and never errors, so this is where type mistakes surface.

use crate::{
    condition::Condition,
    modification::Modification,
    path::FieldPath,
    schema::{FieldType, ModelSchema},
    value::Value,
};
use thiserror::Error as ThisError;

///
/// ValidateError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ValidateError {
    #[error("model '{model}' has no field '{field}'")]
    UnknownField { model: &'static str, field: String },

    #[error("field '{field}' is not optional and cannot be unwrapped")]
    InvalidUnwrap { field: String },

    #[error("'{field}' is not a record and has no fields to address")]
    NotARecord { field: String },

    #[error("operator {operator} does not apply to {ty}")]
    InvalidOperator { operator: &'static str, ty: String },

    #[error("literal does not fit {ty}: {value:?}")]
    LiteralType { ty: String, value: Value },
}

/// Check a condition against a model schema.
pub fn validate_condition(
    schema: &ModelSchema,
    condition: &Condition,
) -> Result<(), ValidateError> {
    check_condition(Cursor::Record(schema), condition)
}

/// Check a modification against a model schema.
pub fn validate_modification(
    schema: &ModelSchema,
    modification: &Modification,
) -> Result<(), ValidateError> {
    check_modification(Cursor::Record(schema), modification)
}

/// Check that a path resolves in a model schema.
pub fn validate_path(schema: &ModelSchema, path: &FieldPath) -> Result<(), ValidateError> {
    resolve_from(Cursor::Record(schema), path).map(|_| ())
}

/// Check a sort key against a model schema. The addressed field must carry
/// an ordered type; optional fields are allowed and sort with unset values
/// first.
pub fn validate_order(schema: &ModelSchema, path: &FieldPath) -> Result<(), ValidateError> {
    let cursor = resolve_from(Cursor::Record(schema), path)?;
    let ty = match cursor {
        Cursor::Ty(FieldType::Option(inner)) => inner,
        Cursor::Ty(ty) => ty,
        Cursor::Record(_) => return Err(invalid(cursor, "OrderBy")),
    };
    if ty.is_orderable() {
        Ok(())
    } else {
        Err(ValidateError::InvalidOperator {
            operator: "OrderBy",
            ty: ty.to_string(),
        })
    }
}

///
/// Cursor
///
/// Position inside a schema while walking a path: at a whole record or at
/// one field type.
///

#[derive(Clone, Copy)]
enum Cursor<'a> {
    Record(&'a ModelSchema),
    Ty(&'a FieldType),
}

impl Cursor<'_> {
    fn type_name(&self) -> String {
        match self {
            Self::Record(schema) => schema.name.to_string(),
            Self::Ty(ty) => ty.to_string(),
        }
    }
}

fn resolve_from<'a>(
    mut cursor: Cursor<'a>,
    path: &FieldPath,
) -> Result<Cursor<'a>, ValidateError> {
    let mut trail = String::new();
    for segment in path.segments() {
        let record = match cursor {
            Cursor::Record(record) => record,
            Cursor::Ty(FieldType::Struct(fields)) => fields(),
            Cursor::Ty(other) => {
                let field = if trail.is_empty() {
                    other.to_string()
                } else {
                    trail
                };
                return Err(ValidateError::NotARecord { field });
            }
        };
        let field = record
            .field(&segment.name)
            .ok_or_else(|| ValidateError::UnknownField {
                model: record.name,
                field: segment.name.clone(),
            })?;
        let mut ty = &field.ty;
        if segment.unwrap {
            match ty {
                FieldType::Option(inner) => ty = inner,
                _ => {
                    return Err(ValidateError::InvalidUnwrap {
                        field: segment.name.clone(),
                    });
                }
            }
        }
        if !trail.is_empty() {
            trail.push('.');
        }
        trail.push_str(&segment.name);
        cursor = Cursor::Ty(ty);
    }
    Ok(cursor)
}

fn check_condition(cursor: Cursor<'_>, condition: &Condition) -> Result<(), ValidateError> {
    match condition {
        Condition::Always | Condition::Never => Ok(()),
        Condition::And(children) | Condition::Or(children) => children
            .iter()
            .try_for_each(|child| check_condition(cursor, child)),
        Condition::Not(child) => check_condition(cursor, child),
        Condition::Equal(value) | Condition::NotEqual(value) => check_literal(cursor, value),
        Condition::GreaterThan(value) => check_ordered(cursor, "GreaterThan", value),
        Condition::LessThan(value) => check_ordered(cursor, "LessThan", value),
        Condition::GreaterOrEqual(value) => check_ordered(cursor, "GreaterOrEqual", value),
        Condition::LessOrEqual(value) => check_ordered(cursor, "LessOrEqual", value),
        Condition::Inside(values) | Condition::NotInside(values) => values
            .iter()
            .try_for_each(|value| check_literal(cursor, value)),
        Condition::StringContains { .. } => match cursor {
            Cursor::Ty(FieldType::Text) => Ok(()),
            other => Err(invalid(other, "StringContains")),
        },
        Condition::AllClear(_) => check_integer(cursor, "AllClear"),
        Condition::AllSet(_) => check_integer(cursor, "AllSet"),
        Condition::AnyClear(_) => check_integer(cursor, "AnyClear"),
        Condition::AnySet(_) => check_integer(cursor, "AnySet"),
        Condition::AllElements(inner) => {
            let element = element_type(cursor, "AllElements")?;
            check_condition(Cursor::Ty(element), inner)
        }
        Condition::AnyElement(inner) => {
            let element = element_type(cursor, "AnyElement")?;
            check_condition(Cursor::Ty(element), inner)
        }
        Condition::SizesEquals(_) => match cursor {
            Cursor::Ty(FieldType::List(_) | FieldType::Map(_)) => Ok(()),
            other => Err(invalid(other, "SizesEquals")),
        },
        Condition::ContainsKey(_) => match cursor {
            Cursor::Ty(FieldType::Map(_)) => Ok(()),
            other => Err(invalid(other, "ContainsKey")),
        },
        Condition::OnField { path, condition } => {
            let target = resolve_from(cursor, path)?;
            check_condition(target, condition)
        }
    }
}

fn check_modification(
    cursor: Cursor<'_>,
    modification: &Modification,
) -> Result<(), ValidateError> {
    match modification {
        Modification::Assign(value) => check_literal(cursor, value),
        Modification::Chain(steps) => steps
            .iter()
            .try_for_each(|step| check_modification(cursor, step)),
        Modification::Increment(amount) => check_numeric(cursor, "Increment", amount),
        Modification::Multiply(amount) => check_numeric(cursor, "Multiply", amount),
        Modification::CoerceAtMost(bound) => check_ordered(cursor, "CoerceAtMost", bound),
        Modification::CoerceAtLeast(bound) => check_ordered(cursor, "CoerceAtLeast", bound),
        Modification::AppendString(_) => match cursor {
            Cursor::Ty(FieldType::Text) => Ok(()),
            other => Err(invalid(other, "AppendString")),
        },
        Modification::ListAppend(items) => {
            let element = element_type(cursor, "ListAppend")?;
            items
                .iter()
                .try_for_each(|item| check_literal(Cursor::Ty(element), item))
        }
        Modification::ListRemoveMatching(condition) => {
            let element = element_type(cursor, "ListRemoveMatching")?;
            check_condition(Cursor::Ty(element), condition)
        }
        Modification::ListRemoveAll(items) => {
            let element = element_type(cursor, "ListRemoveAll")?;
            items
                .iter()
                .try_for_each(|item| check_literal(Cursor::Ty(element), item))
        }
        Modification::ListDropFirst => element_type(cursor, "ListDropFirst").map(|_| ()),
        Modification::ListDropLast => element_type(cursor, "ListDropLast").map(|_| ()),
        Modification::ListPerElement(step) => {
            let element = element_type(cursor, "ListPerElement")?;
            check_modification(Cursor::Ty(element), step)
        }
        Modification::MapPutAll(entries) => {
            let entry = entry_type(cursor, "MapPutAll")?;
            entries
                .values()
                .try_for_each(|value| check_literal(Cursor::Ty(entry), value))
        }
        Modification::MapModifyByKey(steps) => {
            let entry = entry_type(cursor, "MapModifyByKey")?;
            steps
                .values()
                .try_for_each(|step| check_modification(Cursor::Ty(entry), step))
        }
        Modification::MapRemoveKeys(_) => entry_type(cursor, "MapRemoveKeys").map(|_| ()),
        Modification::OnField { path, modification } => {
            let target = resolve_from(cursor, path)?;
            check_modification(target, modification)
        }
    }
}

fn check_literal(cursor: Cursor<'_>, value: &Value) -> Result<(), ValidateError> {
    let fits = match cursor {
        Cursor::Record(schema) => record_fits(schema, value),
        Cursor::Ty(ty) => literal_fits(value, ty),
    };
    if fits {
        Ok(())
    } else {
        Err(ValidateError::LiteralType {
            ty: cursor.type_name(),
            value: value.clone(),
        })
    }
}

fn check_ordered(
    cursor: Cursor<'_>,
    operator: &'static str,
    literal: &Value,
) -> Result<(), ValidateError> {
    match cursor {
        Cursor::Ty(ty) if ty.is_orderable() => {
            if literal_fits(literal, ty) {
                Ok(())
            } else {
                Err(ValidateError::LiteralType {
                    ty: ty.to_string(),
                    value: literal.clone(),
                })
            }
        }
        other => Err(invalid(other, operator)),
    }
}

fn check_numeric(
    cursor: Cursor<'_>,
    operator: &'static str,
    amount: &Value,
) -> Result<(), ValidateError> {
    match cursor {
        Cursor::Ty(ty @ (FieldType::Int | FieldType::Uint | FieldType::Float)) => {
            if literal_fits(amount, ty) {
                Ok(())
            } else {
                Err(ValidateError::LiteralType {
                    ty: ty.to_string(),
                    value: amount.clone(),
                })
            }
        }
        other => Err(invalid(other, operator)),
    }
}

fn check_integer(cursor: Cursor<'_>, operator: &'static str) -> Result<(), ValidateError> {
    match cursor {
        Cursor::Ty(ty) if ty.is_integer() => Ok(()),
        other => Err(invalid(other, operator)),
    }
}

fn element_type<'a>(
    cursor: Cursor<'a>,
    operator: &'static str,
) -> Result<&'a FieldType, ValidateError> {
    match cursor {
        Cursor::Ty(FieldType::List(inner)) => Ok(inner),
        other => Err(invalid(other, operator)),
    }
}

fn entry_type<'a>(
    cursor: Cursor<'a>,
    operator: &'static str,
) -> Result<&'a FieldType, ValidateError> {
    match cursor {
        Cursor::Ty(FieldType::Map(inner)) => Ok(inner),
        other => Err(invalid(other, operator)),
    }
}

fn invalid(cursor: Cursor<'_>, operator: &'static str) -> ValidateError {
    ValidateError::InvalidOperator {
        operator,
        ty: cursor.type_name(),
    }
}

/// Structural fit of a literal against a field type. Optional fields admit
/// `Null`, numeric families never cross.
fn literal_fits(value: &Value, ty: &FieldType) -> bool {
    match (ty, value) {
        (FieldType::Option(_), Value::Null) => true,
        (FieldType::Option(inner), other) => literal_fits(other, inner),
        (FieldType::Bool, Value::Bool(_))
        | (FieldType::Int, Value::Int(_))
        | (FieldType::Uint, Value::Uint(_))
        | (FieldType::Float, Value::Float(_))
        | (FieldType::Text, Value::Text(_))
        | (FieldType::Bytes, Value::Bytes(_)) => true,
        (FieldType::List(inner), Value::List(items)) => {
            items.iter().all(|item| literal_fits(item, inner))
        }
        (FieldType::Map(inner), Value::Map(entries)) => {
            entries.values().all(|entry| literal_fits(entry, inner))
        }
        (FieldType::Struct(fields), other) => record_fits(fields(), other),
        _ => false,
    }
}

/// Fieldwise fit of a map literal against a record schema. Unknown keys are
/// rejected; a key may only be missing when the field is optional.
fn record_fits(schema: &ModelSchema, value: &Value) -> bool {
    let Value::Map(entries) = value else {
        return false;
    };
    if entries.keys().any(|key| schema.field(key).is_none()) {
        return false;
    }
    schema.fields.iter().all(|field| {
        entries.get(field.name).map_or_else(
            || matches!(field.ty, FieldType::Option(_)),
            |entry| literal_fits(entry, &field.ty),
        )
    })
}

///
/// TESTS
///
