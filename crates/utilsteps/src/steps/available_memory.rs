use crate::host::HostProbe;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utilsteps_core::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuccessOutputAvailableMemory {
    pub available_memory: u64,
}

impl Record for SuccessOutputAvailableMemory {
    fn schema() -> ObjectSchema {
        ObjectSchema::new("SuccessOutputAvailableMemory").field(
            Field::byte_count("available_memory")
                .name("available memory")
                .description("Amount of available memory (in bytes)"),
        )
    }
}

define_outputs! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum AvailableMemoryOutput {
        "success" => Success(SuccessOutputAvailableMemory),
    }
}

/// Reports the memory available on the host, in bytes.
#[derive(Debug, Clone)]
pub struct AvailableMemory {
    probe: Arc<dyn HostProbe>,
}

impl AvailableMemory {
    pub fn new(probe: Arc<dyn HostProbe>) -> Self {
        Self { probe }
    }
}

#[async_trait]
impl Step for AvailableMemory {
    type Input = NoInput;
    type Output = AvailableMemoryOutput;

    fn id(&self) -> &str {
        "available_memory"
    }

    fn name(&self) -> &str {
        "Available Memory"
    }

    fn description(&self) -> &str {
        "Amount of available memory (in bytes)"
    }

    async fn execute(&self, _input: NoInput, _run: &RunContext) -> AvailableMemoryOutput {
        AvailableMemoryOutput::Success(SuccessOutputAvailableMemory {
            available_memory: self.probe.available_memory(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::SystemProbe;
    use utilsteps_core::round_trip;

    #[tokio::test]
    async fn test_reports_system_memory() {
        let step = AvailableMemory::new(Arc::new(SystemProbe));
        let AvailableMemoryOutput::Success(out) =
            step.execute(NoInput {}, &RunContext::new("plugin_ci")).await;
        assert!(out.available_memory > 0);
    }

    #[test]
    fn test_serialization() {
        round_trip(&SuccessOutputAvailableMemory {
            available_memory: 8 * 1024 * 1024 * 1024,
        })
        .expect("round trip");
    }
}
