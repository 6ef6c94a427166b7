//! Step registry and dispatcher.

use crate::error::RegistryError;
use crate::output::{OutputTag, Outputs, StepOutcome};
use crate::step::{RunContext, Step, StepDefinition, StepId};
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// A step with its types erased, as stored by the registry.
#[async_trait]
trait Handler: Send + Sync {
    fn definition(&self) -> &StepDefinition;

    async fn call(&self, raw_input: Value, run: &RunContext)
        -> Result<(OutputTag, Value), RegistryError>;
}

struct Bound<S> {
    step: S,
    definition: StepDefinition,
}

#[async_trait]
impl<S: Step> Handler for Bound<S> {
    fn definition(&self) -> &StepDefinition {
        &self.definition
    }

    async fn call(
        &self,
        raw_input: Value,
        run: &RunContext,
    ) -> Result<(OutputTag, Value), RegistryError> {
        let step_id = &self.definition.id;
        let fields = self
            .definition
            .input
            .decode(raw_input)
            .map_err(|e| RegistryError::invalid_input(step_id, &e))?;

        // The schema accepted the value; a serde failure here means the
        // record type and its schema disagree.
        let input: S::Input = serde_json::from_value(Value::Object(fields)).map_err(|e| {
            RegistryError::InvalidInput {
                step_id: step_id.clone(),
                field: self.definition.input.id().to_string(),
                expected: "a value of the declared input record".to_string(),
                details: e.to_string(),
            }
        })?;

        let output = self.step.execute(input, run).await;
        output
            .into_parts()
            .map_err(|e| RegistryError::OutcomeContractViolation {
                step_id: step_id.clone(),
                details: format!("payload could not be encoded: {}", e),
            })
    }
}

/// Immutable mapping from step id to step, built once at startup.
pub struct Registry {
    order: Vec<StepId>,
    steps: HashMap<StepId, Box<dyn Handler>>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("steps", &self.order)
            .finish()
    }
}

impl Registry {
    /// Creates a new registry builder.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Returns the step definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &StepDefinition> {
        self.order
            .iter()
            .filter_map(|id| self.steps.get(id).map(|h| h.definition()))
    }

    /// Returns the definition registered under `step_id`.
    pub fn definition(&self, step_id: &str) -> Option<&StepDefinition> {
        self.steps.get(step_id).map(|h| h.definition())
    }

    /// Returns the registered step ids in registration order.
    pub fn step_ids(&self) -> impl Iterator<Item = &StepId> {
        self.order.iter()
    }

    /// Returns `true` if a step with the given id exists.
    pub fn has_step(&self, step_id: &str) -> bool {
        self.steps.contains_key(step_id)
    }

    /// Returns the number of registered steps.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no steps are registered.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Exports every step definition as a self-describing document.
    pub fn schema_document(&self) -> SchemaDocument {
        SchemaDocument {
            steps: self.definitions().cloned().collect(),
        }
    }

    /// Decodes `raw_input`, runs the step and validates its outcome.
    ///
    /// A step's own non-success outcome is returned as `Ok`. `Err` is
    /// reserved for registry and contract errors.
    pub async fn invoke(
        &self,
        step_id: &str,
        raw_input: Value,
        run: &RunContext,
    ) -> Result<StepOutcome, RegistryError> {
        let handler = self
            .steps
            .get(step_id)
            .ok_or_else(|| RegistryError::UnknownStep(StepId::new(step_id)))?;
        let definition = handler.definition();

        debug!(
            "Dispatching step '{}' (run_id: {})",
            definition.id,
            run.run_id()
        );

        let result = match handler.call(raw_input, run).await {
            Ok((tag, payload)) => verify(definition, tag, payload),
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                if outcome.is_success() {
                    info!(
                        "Step '{}' completed successfully (run_id: {})",
                        definition.id,
                        run.run_id()
                    );
                } else {
                    warn!(
                        "Step '{}' returned '{}' (run_id: {})",
                        definition.id,
                        outcome.tag,
                        run.run_id()
                    );
                }
                Ok(outcome)
            }
            Err(e @ RegistryError::OutcomeContractViolation { .. }) => {
                error!("{}", e);
                Err(e)
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }

    /// Like [`Registry::invoke`], but gives up once `limit` has elapsed.
    ///
    /// Steps are not cancellable; on timeout the in-flight invocation is
    /// dropped at its next suspension point.
    pub async fn invoke_with_timeout(
        &self,
        step_id: &str,
        raw_input: Value,
        run: &RunContext,
        limit: Duration,
    ) -> Result<StepOutcome, RegistryError> {
        match timeout(limit, self.invoke(step_id, raw_input, run)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    "Step '{}' timed out after {:?} (run_id: {})",
                    step_id,
                    limit,
                    run.run_id()
                );
                Err(RegistryError::Timeout {
                    step_id: StepId::new(step_id),
                    after_ms: limit.as_millis(),
                })
            }
        }
    }
}

fn verify(
    definition: &StepDefinition,
    tag: OutputTag,
    payload: Value,
) -> Result<StepOutcome, RegistryError> {
    let violation = |details: String| RegistryError::OutcomeContractViolation {
        step_id: definition.id.clone(),
        details,
    };

    let decl = definition
        .output(tag.as_str())
        .ok_or_else(|| violation(format!("undeclared output tag '{}'", tag)))?;
    decl.schema.check(&payload).map_err(|e| {
        violation(format!(
            "payload for '{}' does not match '{}': {}",
            tag,
            decl.schema.id(),
            e
        ))
    })?;

    Ok(StepOutcome::new(tag, payload))
}

fn validate(definition: &StepDefinition) -> Result<(), RegistryError> {
    let invalid = |details: String| RegistryError::InvalidSchema {
        step_id: definition.id.clone(),
        details,
    };

    if definition.id.as_str().trim().is_empty() {
        return Err(invalid("step id is empty".to_string()));
    }
    definition
        .input
        .validate()
        .map_err(|e| invalid(format!("input: {}", e)))?;

    if definition.outputs.is_empty() {
        return Err(invalid("no outputs declared".to_string()));
    }
    let mut tags = HashSet::new();
    for output in &definition.outputs {
        if output.tag.as_str().is_empty() {
            return Err(invalid("output tag is empty".to_string()));
        }
        if !tags.insert(output.tag.as_str()) {
            return Err(invalid(format!("output '{}' declared twice", output.tag)));
        }
        output
            .schema
            .validate()
            .map_err(|e| invalid(format!("output '{}': {}", output.tag, e)))?;
    }
    if !definition.outputs.iter().any(|o| o.tag.is_success()) {
        return Err(invalid(format!(
            "no '{}' output declared",
            OutputTag::SUCCESS
        )));
    }
    Ok(())
}

/// Builder for constructing [`Registry`] instances.
///
/// Steps keep the order they were registered in.
#[derive(Default)]
pub struct RegistryBuilder {
    steps: Vec<Box<dyn Handler>>,
}

impl RegistryBuilder {
    /// Creates a new empty registry builder.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Adds a step.
    pub fn register<S: Step + 'static>(mut self, step: S) -> Self {
        let definition = StepDefinition::of(&step);
        self.steps.push(Box::new(Bound { step, definition }));
        self
    }

    /// Validates every definition and builds the registry.
    pub fn build(self) -> Result<Registry, RegistryError> {
        let mut order = Vec::with_capacity(self.steps.len());
        let mut steps: HashMap<StepId, Box<dyn Handler>> = HashMap::new();

        for handler in self.steps {
            let definition = handler.definition();
            validate(definition)?;
            let id = definition.id.clone();
            if steps.contains_key(&id) {
                return Err(RegistryError::DuplicateStepId(id));
            }
            order.push(id.clone());
            steps.insert(id, handler);
        }

        debug!("Built registry with {} steps", order.len());
        Ok(Registry { order, steps })
    }
}

/// Schema document describing every registered step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaDocument {
    pub steps: Vec<StepDefinition>,
}

impl SchemaDocument {
    /// Renders the document as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
