//! Typed records and their schemas.

use crate::error::SchemaError;
use crate::schema::{Field, ObjectSchema};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A structured value with a declared schema.
///
/// Step inputs and output payloads are records. The serde representation of
/// the type must agree with [`Record::schema`]; [`round_trip`] checks that.
pub trait Record: Serialize + DeserializeOwned + Send + 'static {
    /// Returns the schema describing this record.
    fn schema() -> ObjectSchema;
}

/// Input for steps that take no parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoInput {}

impl Record for NoInput {
    fn schema() -> ObjectSchema {
        ObjectSchema::new("InputParams")
    }
}

/// Payload of a step's `error` outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ErrorOutput {
    pub error: String,
}

impl ErrorOutput {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl Record for ErrorOutput {
    fn schema() -> ObjectSchema {
        ObjectSchema::new("ErrorOutput").field(
            Field::string("error")
                .name("Failure Error")
                .description("Reason for failure"),
        )
    }
}

/// Encodes a record, checks the encoding against its schema, decodes it again
/// and compares the result with the original.
///
/// # Examples
///
/// ```
/// use utilsteps_core::{round_trip, ErrorOutput};
///
/// round_trip(&ErrorOutput::new("This is an error")).expect("round trip");
/// ```
pub fn round_trip<T: Record + PartialEq>(value: &T) -> Result<(), SchemaError> {
    let schema = T::schema();
    schema.validate()?;

    let failure = |details: String| SchemaError::Serialization {
        record: schema.id().to_string(),
        details,
    };

    let encoded = serde_json::to_value(value).map_err(|e| failure(e.to_string()))?;
    schema
        .check(&encoded)
        .map_err(|e| failure(format!("encoded value does not match schema: {}", e)))?;
    let decoded: T = serde_json::from_value(encoded).map_err(|e| failure(e.to_string()))?;

    if &decoded != value {
        return Err(failure("decoded value differs from the original".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Mislabelled {
        count: i64,
    }

    impl Record for Mislabelled {
        fn schema() -> ObjectSchema {
            ObjectSchema::new("Mislabelled").field(
                Field::string("count")
                    .name("count")
                    .description("Declared as a string on purpose"),
            )
        }
    }

    #[test]
    fn test_error_output_round_trip() {
        assert!(round_trip(&ErrorOutput::new("This is an error")).is_ok());
    }

    #[test]
    fn test_no_input_is_strict() {
        assert!(serde_json::from_value::<NoInput>(json!({})).is_ok());
        assert!(serde_json::from_value::<NoInput>(json!({"x": 1})).is_err());
        assert!(NoInput::schema().fields().is_empty());
    }

    #[test]
    fn test_round_trip_detects_schema_drift() {
        let result = round_trip(&Mislabelled { count: 3 });
        assert!(matches!(result, Err(SchemaError::Serialization { .. })));
    }
}
