use crate::host::HostProbe;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utilsteps_core::prelude::*;

/// Message of the `error` outcome when the host cannot report its CPUs.
pub const CPU_COUNT_UNDETERMINED: &str = "could not determine CPU count";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuccessOutputNumCpu {
    pub num_cpu: u64,
}

impl Record for SuccessOutputNumCpu {
    fn schema() -> ObjectSchema {
        ObjectSchema::new("SuccessOutputNumCpu").field(
            Field::integer("num_cpu")
                .name("num cpu")
                .description("Number of logical CPUs")
                .min(1),
        )
    }
}

define_outputs! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum NumCpuOutput {
        "success" => Success(SuccessOutputNumCpu),
        "error" => Error(ErrorOutput),
    }
}

/// Reports the number of logical CPUs.
#[derive(Debug, Clone)]
pub struct NumCpu {
    probe: Arc<dyn HostProbe>,
}

impl NumCpu {
    pub fn new(probe: Arc<dyn HostProbe>) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl Step for NumCpu {
    type Input = NoInput;
    type Output = NumCpuOutput;

    fn id(&self) -> &str {
        "num_cpu"
    }

    fn name(&self) -> &str {
        "Num Cpu"
    }

    fn description(&self) -> &str {
        "Number of logical CPUs"
    }

    async fn execute(&self, _input: NoInput, _run: &RunContext) -> NumCpuOutput {
        let count = self
            .probe
            .logical_cpus()
            .and_then(|count| u64::try_from(count.get()).ok());
        match count {
            Some(num_cpu) => NumCpuOutput::Success(SuccessOutputNumCpu { num_cpu }),
            None => NumCpuOutput::Error(ErrorOutput::new(CPU_COUNT_UNDETERMINED)),
        }
    }
}
