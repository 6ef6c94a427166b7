use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use utilsteps_core::prelude::*;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuccessOutputUuid {
    pub uuid: String,
}

impl Record for SuccessOutputUuid {
    fn schema() -> ObjectSchema {
        ObjectSchema::new("SuccessOutputUuid").field(
            Field::string("uuid")
                .name("UUID")
                .description("A randomly generated UUID"),
        )
    }
}

define_outputs! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum UuidOutput {
        "success" => Success(SuccessOutputUuid),
        "error" => Error(ErrorOutput),
    }
}

/// Generates a random (v4) UUID.
#[derive(Debug, Default)]
pub struct GenerateUuid;

#[async_trait]
impl Step for GenerateUuid {
    type Input = NoInput;
    type Output = UuidOutput;

    fn id(&self) -> &str {
        "uuid"
    }

    fn name(&self) -> &str {
        "Generate UUID"
    }

    fn description(&self) -> &str {
        "Generates a random UUID which can be used for tracking uniqueness"
    }

    async fn execute(&self, _input: NoInput, _run: &RunContext) -> UuidOutput {
        UuidOutput::Success(SuccessOutputUuid {
            uuid: Uuid::new_v4().to_string(),
        })
    }
}
