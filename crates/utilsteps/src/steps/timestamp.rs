use async_trait::async_trait;
use chrono::{Local, SecondsFormat};
use serde::{Deserialize, Serialize};
use utilsteps_core::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SuccessOutputTimestamp {
    pub timestamp: String,
}

impl Record for SuccessOutputTimestamp {
    fn schema() -> ObjectSchema {
        ObjectSchema::new("SuccessOutputTimestamp").field(
            Field::string("timestamp")
                .name("timestamp")
                .description("An ISO 8601 timestamp with millisecond precision"),
        )
    }
}

define_outputs! {
    #[derive(Debug, Clone, PartialEq)]
    pub enum TimestampOutput {
        "success" => Success(SuccessOutputTimestamp),
        "error" => Error(ErrorOutput),
    }
}

/// Reads the wall clock as an RFC 3339 timestamp in the local offset,
/// e.g. `2023-11-20T18:34:59.784+01:00`.
#[derive(Debug, Default)]
pub struct GenerateTimestamp;

#[async_trait]
impl Step for GenerateTimestamp {
    type Input = NoInput;
    type Output = TimestampOutput;

    fn id(&self) -> &str {
        "timestamp"
    }

    fn name(&self) -> &str {
        "Generate timestamp"
    }

    fn description(&self) -> &str {
        "Generates a timestamp of the current time in ISO 8601 format with millisecond accuracy"
    }

    async fn execute(&self, _input: NoInput, _run: &RunContext) -> TimestampOutput {
        TimestampOutput::Success(SuccessOutputTimestamp {
            timestamp: Local::now().to_rfc3339_opts(SecondsFormat::Millis, false),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;
    use utilsteps_core::round_trip;

    async fn now() -> String {
        match GenerateTimestamp
            .execute(NoInput {}, &RunContext::new("plugin_ci"))
            .await
        {
            TimestampOutput::Success(out) => out.timestamp,
            TimestampOutput::Error(e) => panic!("unexpected error: {}", e.error),
        }
    }

    #[tokio::test]
    async fn test_millisecond_precision_with_offset() {
        let ts = now().await;
        assert!(DateTime::parse_from_rfc3339(&ts).is_ok(), "not RFC 3339: {ts}");

        let fraction = ts.split('.').nth(1).expect("fractional seconds");
        let (millis, offset) = fraction.split_at(3);
        assert!(millis.chars().all(|c| c.is_ascii_digit()), "{ts}");
        assert!(offset.starts_with('+') || offset.starts_with('-'), "{ts}");
    }

    #[tokio::test]
    async fn test_timestamps_do_not_decrease() {
        let first = DateTime::parse_from_rfc3339(&now().await).expect("valid");
        let second = DateTime::parse_from_rfc3339(&now().await).expect("valid");
        assert!(second >= first);
    }

    #[test]
    fn test_serialization() {
        round_trip(&SuccessOutputTimestamp {
            timestamp: "2023-11-20T18:34:59.784498Z".to_string(),
        })
        .expect("round trip");
    }
}
