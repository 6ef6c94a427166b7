//! Record type descriptors and strict value checking.
//!
//! A record is an ordered set of named fields. Each field has one of a few
//! primitive semantic types plus display metadata, and a record schema can
//! both validate itself and check a `serde_json::Value` against it.

use crate::error::{FieldError, SchemaError};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

/// Primitive semantic type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    /// UTF-8 text.
    String,
    /// Signed 64-bit integer (unsigned values up to `u64::MAX` are accepted).
    Integer,
    /// Floating point number. Integral JSON numbers are accepted.
    Float,
    /// Non-negative integer count of bytes.
    ByteCount,
}

impl FieldType {
    fn is_integer_like(self) -> bool {
        matches!(self, FieldType::Integer | FieldType::ByteCount)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::ByteCount => write!(f, "byte count"),
        }
    }
}

/// Unit attached to a numeric field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Unit {
    /// Bytes.
    Bytes,
    /// Milliseconds.
    Milliseconds,
}

impl Unit {
    fn applies_to(self, field_type: FieldType) -> bool {
        match self {
            Unit::Bytes => field_type.is_integer_like(),
            Unit::Milliseconds => matches!(field_type, FieldType::Integer | FieldType::Float),
        }
    }
}

/// A single named field of a record.
///
/// # Examples
///
/// ```
/// use utilsteps_core::{Field, FieldType, Unit};
///
/// let field = Field::integer("wait_time_ms")
///     .name("Wait time")
///     .description("How long to wait in milliseconds")
///     .unit(Unit::Milliseconds)
///     .min(0);
///
/// assert_eq!(field.field_type(), FieldType::Integer);
/// assert!(field.is_required());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    id: String,
    #[serde(rename = "type")]
    field_type: FieldType,
    name: String,
    description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<Unit>,
    required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    min: Option<i64>,
}

impl Field {
    /// Creates a required field of the given type with empty metadata.
    pub fn new(id: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            id: id.into(),
            field_type,
            name: String::new(),
            description: String::new(),
            unit: None,
            required: true,
            min: None,
        }
    }

    /// Creates a string field.
    pub fn string(id: impl Into<String>) -> Self {
        Self::new(id, FieldType::String)
    }

    /// Creates an integer field.
    pub fn integer(id: impl Into<String>) -> Self {
        Self::new(id, FieldType::Integer)
    }

    /// Creates a float field.
    pub fn float(id: impl Into<String>) -> Self {
        Self::new(id, FieldType::Float)
    }

    /// Creates a byte-count field with the [`Unit::Bytes`] unit.
    pub fn byte_count(id: impl Into<String>) -> Self {
        Self::new(id, FieldType::ByteCount).unit(Unit::Bytes)
    }

    /// Sets the human-readable display name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the unit.
    pub fn unit(mut self, unit: Unit) -> Self {
        self.unit = Some(unit);
        self
    }

    /// Marks the field as optional.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Sets an inclusive lower bound. Only valid on integer-like fields.
    pub fn min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn display_name(&self) -> &str {
        &self.name
    }

    pub fn unit_of(&self) -> Option<Unit> {
        self.unit
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    fn validate(&self, record: &str) -> Result<(), SchemaError> {
        if self.id.is_empty() {
            return Err(SchemaError::EmptyFieldId {
                record: record.to_string(),
            });
        }
        if self.name.trim().is_empty() {
            return Err(self.missing(record, "display name"));
        }
        if self.description.trim().is_empty() {
            return Err(self.missing(record, "description"));
        }
        if self.min.is_some() && !self.field_type.is_integer_like() {
            return Err(self.incompatible(record, "a minimum only applies to integer fields"));
        }
        if let Some(unit) = self.unit {
            if !unit.applies_to(self.field_type) {
                return Err(self.incompatible(record, "unit does not apply to this type"));
            }
        }
        Ok(())
    }

    fn missing(&self, record: &str, what: &'static str) -> SchemaError {
        SchemaError::MissingMetadata {
            record: record.to_string(),
            field: self.id.clone(),
            what,
        }
    }

    fn incompatible(&self, record: &str, reason: &'static str) -> SchemaError {
        SchemaError::IncompatibleConstraint {
            record: record.to_string(),
            field: self.id.clone(),
            field_type: self.field_type,
            reason,
        }
    }

    fn check(&self, value: &Value) -> Result<(), FieldError> {
        let mismatch = || FieldError::TypeMismatch {
            field: self.id.clone(),
            expected: self.field_type,
            found: describe(value),
        };

        match self.field_type {
            FieldType::String => {
                if !value.is_string() {
                    return Err(mismatch());
                }
            }
            FieldType::Float => {
                if !value.is_number() {
                    return Err(mismatch());
                }
            }
            FieldType::Integer => {
                if !(value.is_i64() || value.is_u64()) {
                    return Err(mismatch());
                }
            }
            FieldType::ByteCount => {
                if !value.is_u64() {
                    return Err(mismatch());
                }
            }
        }

        if let (Some(min), Some(found)) = (self.min, value.as_i64()) {
            if found < min {
                return Err(FieldError::BelowMinimum {
                    field: self.id.clone(),
                    min,
                    found,
                });
            }
        }
        Ok(())
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Number(n) if n.is_f64() => format!("float {}", n),
        Value::Number(n) if n.is_i64() && n.as_i64().is_some_and(|v| v < 0) => {
            format!("negative integer {}", n)
        }
        Value::Number(n) => format!("integer {}", n),
        Value::String(_) => "string".to_string(),
        Value::Array(_) => "array".to_string(),
        Value::Object(_) => "object".to_string(),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Descriptor of a structured record type.
///
/// # Examples
///
/// ```
/// use serde_json::json;
/// use utilsteps_core::{Field, ObjectSchema};
///
/// let schema = ObjectSchema::new("SuccessOutputUuid").field(
///     Field::string("uuid")
///         .name("UUID")
///         .description("A randomly generated UUID"),
/// );
/// schema.validate().expect("valid schema");
///
/// assert!(schema.check(&json!({"uuid": "abc"})).is_ok());
/// assert!(schema.check(&json!({"uuid": 1})).is_err());
/// assert!(schema.check(&json!({"uuid": "abc", "extra": true})).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObjectSchema {
    id: String,
    fields: Vec<Field>,
}

impl ObjectSchema {
    /// Creates an empty record schema.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Vec::new(),
        }
    }

    /// Appends a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field with the given id.
    pub fn get(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Checks that the declaration itself is well formed.
    pub fn validate(&self) -> Result<(), SchemaError> {
        if self.id.trim().is_empty() {
            return Err(SchemaError::EmptyRecordId);
        }
        let mut seen = HashSet::new();
        for field in &self.fields {
            field.validate(&self.id)?;
            if !seen.insert(field.id.as_str()) {
                return Err(SchemaError::DuplicateField {
                    record: self.id.clone(),
                    field: field.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Checks a value against this schema without copying it.
    ///
    /// Unknown fields are rejected.
    pub fn check(&self, value: &Value) -> Result<(), FieldError> {
        let empty = Map::new();
        let object = match value {
            Value::Object(map) => map,
            Value::Null => &empty,
            other => {
                return Err(FieldError::NotAnObject {
                    record: self.id.clone(),
                    found: kind(other),
                })
            }
        };

        if let Some(unknown) = object.keys().find(|k| self.get(k).is_none()) {
            return Err(FieldError::Unknown {
                field: unknown.clone(),
            });
        }

        for field in &self.fields {
            match object.get(&field.id) {
                Some(v) => field.check(v)?,
                None if field.required => {
                    return Err(FieldError::Missing {
                        field: field.id.clone(),
                        expected: field.field_type,
                    })
                }
                None => {}
            }
        }
        Ok(())
    }

    /// Strictly decodes a raw value into a field map conforming to this schema.
    ///
    /// `null` decodes as the empty record.
    pub fn decode(&self, value: Value) -> Result<Map<String, Value>, FieldError> {
        self.check(&value)?;
        match value {
            Value::Object(map) => Ok(map),
            _ => Ok(Map::new()),
        }
    }
}
