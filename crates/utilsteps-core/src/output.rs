//! Tagged-union step outputs.

use crate::record::Record;
use crate::schema::ObjectSchema;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Discriminator naming which output variant a step produced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OutputTag(String);

impl OutputTag {
    /// Tag of the outcome every step must declare.
    pub const SUCCESS: &'static str = "success";
    /// Conventional tag for business-level failures.
    pub const ERROR: &'static str = "error";

    /// Creates a tag from any string.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the `success` tag.
    pub fn success() -> Self {
        Self::new(Self::SUCCESS)
    }

    /// Returns the `error` tag.
    pub fn error() -> Self {
        Self::new(Self::ERROR)
    }

    /// Returns `true` for the `success` tag.
    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }

    /// Returns the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutputTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OutputTag {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl AsRef<str> for OutputTag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for OutputTag {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for OutputTag {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// One declared output variant: its tag and payload schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputDecl {
    pub tag: OutputTag,
    pub schema: ObjectSchema,
}

impl OutputDecl {
    pub fn new(tag: impl Into<OutputTag>, schema: ObjectSchema) -> Self {
        Self {
            tag: tag.into(),
            schema,
        }
    }

    /// Declares an output whose payload is the record `T`.
    pub fn of<T: Record>(tag: impl Into<OutputTag>) -> Self {
        Self::new(tag, T::schema())
    }
}

/// The closed set of outputs a step can produce.
///
/// Usually implemented through [`define_outputs!`](crate::define_outputs).
pub trait Outputs: Send + 'static {
    /// Returns every output variant in declaration order.
    fn declared() -> Vec<OutputDecl>;

    /// Splits the value into its tag and encoded payload.
    fn into_parts(self) -> Result<(OutputTag, Value), serde_json::Error>;
}

/// The result of invoking a step through the registry.
///
/// Serializes as `{"output_id": <tag>, "output_data": <payload>}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutcome {
    #[serde(rename = "output_id")]
    pub tag: OutputTag,
    #[serde(rename = "output_data")]
    pub payload: Value,
}

impl StepOutcome {
    /// Creates an outcome from a tag and its encoded payload.
    pub fn new(tag: OutputTag, payload: Value) -> Self {
        Self { tag, payload }
    }

    /// Returns `true` if the step reported `success`.
    pub fn is_success(&self) -> bool {
        self.tag.is_success()
    }

    /// Decodes the payload into a typed record.
    pub fn payload_as<T: Record>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.payload.clone())
    }
}
