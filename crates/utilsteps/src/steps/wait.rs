use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::debug;
use utilsteps_core::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WaitInput {
    pub wait_time_ms: u64,
}

impl Record for WaitInput {
    fn schema() -> ObjectSchema {
        ObjectSchema::new("WaitInput").field(
            Field::integer("wait_time_ms")
                .name("Wait time")
                .description("How long to wait in milliseconds")
                .unit(Unit::Milliseconds)
                .min(0),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuccessOutputWait {
    pub waited_ms: f64,
}

impl Record for SuccessOutputWait {
    fn schema() -> ObjectSchema {
        ObjectSchema::new("SuccessOutputWait").field(
            Field::float("waited_ms")
                .name("waited")
                .description("Confirmation of milliseconds waited")
                .unit(Unit::Milliseconds),
        )
    }
}

define_outputs! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum WaitOutput {
        "success" => Success(SuccessOutputWait),
        "error" => Error(ErrorOutput),
    }
}

/// Suspends for the requested number of milliseconds and reports the
/// measured wait.
#[derive(Debug, Default)]
pub struct Wait;

#[async_trait]
impl Step for Wait {
    type Input = WaitInput;
    type Output = WaitOutput;

    fn id(&self) -> &str {
        "wait"
    }

    fn name(&self) -> &str {
        "Wait"
    }

    fn description(&self) -> &str {
        "Wait for specified milliseconds"
    }

    async fn execute(&self, input: WaitInput, run: &RunContext) -> WaitOutput {
        let started = Instant::now();
        if input.wait_time_ms > 0 {
            debug!(
                "Waiting {}ms (run_id: {})",
                input.wait_time_ms,
                run.run_id()
            );
            tokio::time::sleep(Duration::from_millis(input.wait_time_ms)).await;
        }
        WaitOutput::Success(SuccessOutputWait {
            waited_ms: started.elapsed().as_secs_f64() * 1000.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use utilsteps_core::round_trip;

    async fn waited(ms: u64) -> f64 {
        match Wait
            .execute(WaitInput { wait_time_ms: ms }, &RunContext::new("plugin_ci"))
            .await
        {
            WaitOutput::Success(out) => out.waited_ms,
            WaitOutput::Error(e) => panic!("unexpected error: {}", e.error),
        }
    }

    #[tokio::test]
    async fn test_waits_at_least_requested_time() {
        let started = Instant::now();
        let reported = waited(500).await;
        assert!(started.elapsed() >= Duration::from_millis(500));
        assert!(reported >= 500.0, "reported {reported}");
    }

    #[tokio::test]
    async fn test_zero_returns_immediately() {
        let reported = waited(0).await;
        assert!(reported < 50.0, "reported {reported}");
    }

    #[test]
    fn test_serialization() {
        round_trip(&SuccessOutputWait { waited_ms: 1.234 }).expect("round trip");
        round_trip(&WaitInput { wait_time_ms: 500 }).expect("round trip");
    }
}
