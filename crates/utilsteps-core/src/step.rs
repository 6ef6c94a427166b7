//! Step trait and related types.

use crate::output::{OutputDecl, Outputs};
use crate::record::Record;
use crate::schema::ObjectSchema;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt::{self, Debug};
use std::time::{Duration, Instant};

/// Type-safe step identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StepId(String);

impl StepId {
    /// Creates a new StepId.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StepId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for StepId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for StepId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for StepId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for StepId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for StepId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Correlation data threaded through a single invocation.
///
/// The run id is opaque to the registry; it only appears in logs and is
/// handed to the step.
#[derive(Debug, Clone)]
pub struct RunContext {
    run_id: String,
    started_at: Instant,
}

impl Default for RunContext {
    fn default() -> Self {
        Self::new(uuid::Uuid::new_v4().to_string())
    }
}

impl RunContext {
    /// Creates a context with the given run id.
    pub fn new(run_id: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: Instant::now(),
        }
    }

    /// Returns the correlation id of this run.
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Returns the time elapsed since the context was created.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// A named operation with one input record and a closed set of outputs.
///
/// # Examples
///
/// ```
/// use async_trait::async_trait;
/// use serde::{Deserialize, Serialize};
/// use utilsteps_core::{
///     define_outputs, ErrorOutput, Field, NoInput, ObjectSchema, Record, RunContext, Step,
/// };
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// pub struct Greeting {
///     pub message: String,
/// }
///
/// impl Record for Greeting {
///     fn schema() -> ObjectSchema {
///         ObjectSchema::new("Greeting").field(
///             Field::string("message").name("Message").description("A friendly greeting"),
///         )
///     }
/// }
///
/// define_outputs! {
///     #[derive(Debug)]
///     pub enum GreetOutput {
///         "success" => Success(Greeting),
///         "error" => Error(ErrorOutput),
///     }
/// }
///
/// #[derive(Debug)]
/// struct Greet;
///
/// #[async_trait]
/// impl Step for Greet {
///     type Input = NoInput;
///     type Output = GreetOutput;
///
///     fn id(&self) -> &str { "greet" }
///     fn name(&self) -> &str { "Greet" }
///     fn description(&self) -> &str { "Says hello" }
///
///     async fn execute(&self, _input: NoInput, _run: &RunContext) -> GreetOutput {
///         GreetOutput::Success(Greeting { message: "hello".to_string() })
///     }
/// }
/// ```
#[async_trait]
pub trait Step: Send + Sync + Debug {
    /// The decoded input record.
    type Input: Record;
    /// The tagged union of outputs.
    type Output: Outputs;

    /// Unique registry key.
    fn id(&self) -> &str;

    /// Display name.
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// Runs the step.
    ///
    /// Business failures are returned as a declared output variant rather
    /// than as an error.
    async fn execute(&self, input: Self::Input, run: &RunContext) -> Self::Output;
}

/// Immutable description of a registered step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepDefinition {
    pub id: StepId,
    pub name: String,
    pub description: String,
    pub input: ObjectSchema,
    pub outputs: Vec<OutputDecl>,
}

impl StepDefinition {
    /// Derives the definition of a step from its declared types.
    pub fn of<S: Step>(step: &S) -> Self {
        Self {
            id: StepId::new(step.id()),
            name: step.name().to_string(),
            description: step.description().to_string(),
            input: S::Input::schema(),
            outputs: S::Output::declared(),
        }
    }

    /// Returns the declaration for the given output tag.
    pub fn output(&self, tag: &str) -> Option<&OutputDecl> {
        self.outputs.iter().find(|o| o.tag.as_str() == tag)
    }
}
