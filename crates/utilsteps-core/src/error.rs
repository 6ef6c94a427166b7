//! Registry and schema error types.

use crate::schema::FieldType;
use crate::step::StepId;
use thiserror::Error;

/// A schema declaration that cannot be encoded or validated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SchemaError {
    /// The record has no identifier.
    #[error("record schema has an empty id")]
    EmptyRecordId,

    /// A field has no identifier.
    #[error("record '{record}' has a field with an empty id")]
    EmptyFieldId {
        /// The record declaring the field.
        record: String,
    },

    /// Two fields in one record share an identifier.
    #[error("record '{record}' declares field '{field}' more than once")]
    DuplicateField {
        /// The record declaring the fields.
        record: String,
        /// The repeated field id.
        field: String,
    },

    /// A field is missing its display name or description.
    #[error("field '{record}.{field}' is missing its {what}")]
    MissingMetadata {
        /// The record declaring the field.
        record: String,
        /// The field id.
        field: String,
        /// Which piece of metadata is missing.
        what: &'static str,
    },

    /// A constraint or unit does not apply to the field's type.
    #[error("field '{record}.{field}' of type {field_type}: {reason}")]
    IncompatibleConstraint {
        /// The record declaring the field.
        record: String,
        /// The field id.
        field: String,
        /// The declared field type.
        field_type: FieldType,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// A value failed to encode or decode against its record type.
    #[error("record '{record}' does not round-trip: {details}")]
    Serialization {
        /// The record being checked.
        record: String,
        /// What went wrong.
        details: String,
    },
}

/// A structured value that does not conform to a record schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldError {
    /// The value is not an object.
    #[error("expected an object for record '{record}', got {found}")]
    NotAnObject {
        /// The record the value was checked against.
        record: String,
        /// The JSON kind that was found.
        found: &'static str,
    },

    /// A required field is absent.
    #[error("missing required field '{field}' ({expected})")]
    Missing {
        /// The absent field.
        field: String,
        /// The declared type of the field.
        expected: FieldType,
    },

    /// The value carries a field the schema does not declare.
    #[error("unknown field '{field}'")]
    Unknown {
        /// The undeclared field.
        field: String,
    },

    /// A field holds a value of the wrong type.
    #[error("field '{field}' expected {expected}, got {found}")]
    TypeMismatch {
        /// The offending field.
        field: String,
        /// The declared type of the field.
        expected: FieldType,
        /// A short description of what was found.
        found: String,
    },

    /// An integer field is below its declared minimum.
    #[error("field '{field}' must be >= {min}, got {found}")]
    BelowMinimum {
        /// The offending field.
        field: String,
        /// The declared lower bound.
        min: i64,
        /// The value that was found.
        found: i64,
    },
}

impl FieldError {
    /// Returns the name of the offending field, or the record name when the
    /// whole value is rejected.
    pub fn field(&self) -> &str {
        match self {
            FieldError::NotAnObject { record, .. } => record,
            FieldError::Missing { field, .. }
            | FieldError::Unknown { field }
            | FieldError::TypeMismatch { field, .. }
            | FieldError::BelowMinimum { field, .. } => field,
        }
    }

    /// Returns a description of what the schema expected at the offending field.
    pub fn expected(&self) -> String {
        match self {
            FieldError::NotAnObject { .. } => "object".to_string(),
            FieldError::Missing { expected, .. } | FieldError::TypeMismatch { expected, .. } => {
                expected.to_string()
            }
            FieldError::Unknown { .. } => "no such field".to_string(),
            FieldError::BelowMinimum { min, .. } => format!("integer >= {}", min),
        }
    }
}

/// Errors raised by the step registry.
///
/// These are caller, integration or implementation mistakes. A step that
/// reports a declared non-success outcome (such as `error`) is not one of
/// them: that arrives as a normal [`StepOutcome`](crate::StepOutcome).
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RegistryError {
    /// Two registered steps share an id.
    #[error("Duplicate step id: {0}")]
    DuplicateStepId(StepId),

    /// A step's input or output declaration is not usable.
    #[error("Invalid schema for step '{step_id}': {details}")]
    InvalidSchema {
        /// The step whose declaration was rejected.
        step_id: StepId,
        /// Why it was rejected.
        details: String,
    },

    /// No step is registered under the requested id.
    #[error("Unknown step: {0}")]
    UnknownStep(StepId),

    /// The raw input does not decode into the step's input type.
    #[error("Invalid input for step '{step_id}' at field '{field}' (expected {expected}): {details}")]
    InvalidInput {
        /// The step that was invoked.
        step_id: StepId,
        /// The offending field.
        field: String,
        /// What the schema expected there.
        expected: String,
        /// The decoding failure.
        details: String,
    },

    /// A step returned an undeclared tag or a payload that does not match
    /// the tag's schema. Always a bug in the step implementation.
    #[error("Outcome contract violated by step '{step_id}': {details}")]
    OutcomeContractViolation {
        /// The step that broke its contract.
        step_id: StepId,
        /// What was wrong with the outcome.
        details: String,
    },

    /// The caller-side deadline elapsed before the step finished.
    #[error("Timeout occurred in step '{step_id}' after {after_ms}ms")]
    Timeout {
        /// The step that was still running.
        step_id: StepId,
        /// The deadline that elapsed.
        after_ms: u128,
    },
}

impl RegistryError {
    pub(crate) fn invalid_input(step_id: &StepId, source: &FieldError) -> Self {
        RegistryError::InvalidInput {
            step_id: step_id.clone(),
            field: source.field().to_string(),
            expected: source.expected(),
            details: source.to_string(),
        }
    }
}
