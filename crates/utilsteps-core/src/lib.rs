//! Typed step registry with tagged-union outputs.
//!
//! A [`Step`] declares one input [`Record`] and a closed set of outputs, each
//! tagged (`success`, `error`, ...) and carrying its own record payload. Steps
//! are registered once into an immutable [`Registry`], which decodes raw
//! input against the step's schema, runs it, and checks that the outcome
//! honours the declared outputs.
//!
//! # Core Types
//!
//! - [`ObjectSchema`] / [`Field`] - Record type descriptors
//! - [`Record`] - A serde type with a schema
//! - [`Outputs`] / [`define_outputs!`] - A step's tagged union of outputs
//! - [`Step`] - The typed step trait
//! - [`Registry`] - Validation, dispatch and schema export
//! - [`RegistryError`] - Contract-level errors, distinct from business outcomes
//!
//! # Example
//!
//! ```rust
//! use async_trait::async_trait;
//! use serde::{Deserialize, Serialize};
//! use serde_json::json;
//! use utilsteps_core::prelude::*;
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! pub struct Doubled {
//!     pub value: i64,
//! }
//!
//! impl Record for Doubled {
//!     fn schema() -> ObjectSchema {
//!         ObjectSchema::new("Doubled")
//!             .field(Field::integer("value").name("Value").description("Twice the input"))
//!     }
//! }
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! #[serde(deny_unknown_fields)]
//! struct DoubleInput {
//!     value: i64,
//! }
//!
//! impl Record for DoubleInput {
//!     fn schema() -> ObjectSchema {
//!         ObjectSchema::new("DoubleInput")
//!             .field(Field::integer("value").name("Value").description("Number to double"))
//!     }
//! }
//!
//! define_outputs! {
//!     #[derive(Debug)]
//!     pub enum DoubleOutput {
//!         "success" => Success(Doubled),
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct Double;
//!
//! #[async_trait]
//! impl Step for Double {
//!     type Input = DoubleInput;
//!     type Output = DoubleOutput;
//!
//!     fn id(&self) -> &str { "double" }
//!     fn name(&self) -> &str { "Double" }
//!     fn description(&self) -> &str { "Doubles a number" }
//!
//!     async fn execute(&self, input: DoubleInput, _run: &RunContext) -> DoubleOutput {
//!         DoubleOutput::Success(Doubled { value: input.value * 2 })
//!     }
//! }
//!
//! # #[tokio::main]
//! # async fn main() {
//! let registry = Registry::builder()
//!     .register(Double)
//!     .build()
//!     .expect("valid registry");
//!
//! let outcome = registry
//!     .invoke("double", json!({"value": 21}), &RunContext::new("docs"))
//!     .await
//!     .expect("invocation");
//!
//! assert_eq!(outcome.tag, "success");
//! assert_eq!(outcome.payload, json!({"value": 42}));
//! # }
//! ```

mod error;
mod output;
mod record;
mod registry;
mod schema;
mod step;

pub use error::{FieldError, RegistryError, SchemaError};
pub use output::{OutputDecl, OutputTag, Outputs, StepOutcome};
pub use record::{round_trip, ErrorOutput, NoInput, Record};
pub use registry::{Registry, RegistryBuilder, SchemaDocument};
pub use schema::{Field, FieldType, ObjectSchema, Unit};
pub use step::{RunContext, Step, StepDefinition, StepId};

#[doc(hidden)]
pub use serde_json as __serde_json;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        define_outputs, ErrorOutput, Field, FieldType, NoInput, ObjectSchema, OutputTag, Outputs,
        Record, Registry, RegistryError, RunContext, Step, StepOutcome, Unit,
    };
}

/// Macro to declare a step's outputs as an enum
///
/// Each variant is bound to an output tag and wraps a [`Record`] payload.
/// The macro implements [`Outputs`] for the enum, so a step can only ever
/// produce one of the declared tags.
///
/// # Example
///
/// ```rust
/// use utilsteps_core::{define_outputs, ErrorOutput, Outputs};
///
/// define_outputs! {
///     #[derive(Debug)]
///     pub enum ProbeOutput {
///         "success" => Success(ErrorOutput),
///         "error" => Error(ErrorOutput),
///     }
/// }
///
/// let tags: Vec<_> = ProbeOutput::declared()
///     .into_iter()
///     .map(|d| d.tag.to_string())
///     .collect();
/// assert_eq!(tags, vec!["success", "error"]);
///
/// let (tag, payload) = ProbeOutput::Error(ErrorOutput::new("nope"))
///     .into_parts()
///     .expect("encodable");
/// assert_eq!(tag, "error");
/// assert_eq!(payload["error"], "nope");
/// ```
#[macro_export]
macro_rules! define_outputs {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $($tag:literal => $variant:ident($payload:ty)),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $($variant($payload)),+
        }

        impl $crate::Outputs for $name {
            fn declared() -> ::std::vec::Vec<$crate::OutputDecl> {
                ::std::vec![
                    $($crate::OutputDecl::of::<$payload>($tag)),+
                ]
            }

            fn into_parts(
                self,
            ) -> ::std::result::Result<
                ($crate::OutputTag, $crate::__serde_json::Value),
                $crate::__serde_json::Error,
            > {
                match self {
                    $(
                        $name::$variant(payload) => ::std::result::Result::Ok((
                            $crate::OutputTag::new($tag),
                            $crate::__serde_json::to_value(payload)?,
                        )),
                    )+
                }
            }
        }
    };
}
