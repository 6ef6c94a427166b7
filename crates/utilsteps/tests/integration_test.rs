use chrono::DateTime;
use serde_json::{json, Value};
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use utilsteps::host::HostProbe;
use utilsteps::steps::{
    SuccessOutputAvailableMemory, SuccessOutputNumCpu, SuccessOutputTimestamp, SuccessOutputUuid,
    SuccessOutputWait,
};
use utilsteps::{registry, registry_with_probe};
use utilsteps_core::{round_trip, ErrorOutput, Registry, RegistryError, RunContext, SchemaError};

fn run() -> RunContext {
    RunContext::new("plugin_ci")
}

fn utilities() -> Registry {
    registry().expect("valid registry")
}

#[derive(Debug)]
struct BlindHost;

impl HostProbe for BlindHost {
    fn logical_cpus(&self) -> Option<NonZeroUsize> {
        None
    }

    fn available_memory(&self) -> u64 {
        4096
    }
}

#[test]
fn test_registers_all_steps_in_order() {
    let ids: Vec<_> = utilities()
        .step_ids()
        .map(|id| id.as_str().to_string())
        .collect();
    assert_eq!(
        ids,
        vec!["uuid", "timestamp", "wait", "num_cpu", "available_memory"]
    );
}

#[tokio::test]
async fn test_uuid() {
    let registry = utilities();
    let first = registry
        .invoke("uuid", json!({}), &run())
        .await
        .expect("invocation");
    let second = registry
        .invoke("uuid", Value::Null, &run())
        .await
        .expect("invocation");

    assert_eq!(first.tag, "success");
    let a: SuccessOutputUuid = first.payload_as().expect("typed payload");
    let b: SuccessOutputUuid = second.payload_as().expect("typed payload");
    assert!(uuid::Uuid::parse_str(&a.uuid).is_ok());
    assert_ne!(a.uuid, b.uuid);
}

#[tokio::test]
async fn test_timestamp() {
    let registry = utilities();
    let first = registry
        .invoke("timestamp", json!({}), &run())
        .await
        .expect("invocation");
    let second = registry
        .invoke("timestamp", json!({}), &run())
        .await
        .expect("invocation");

    assert!(first.is_success());
    let a: SuccessOutputTimestamp = first.payload_as().expect("typed payload");
    let b: SuccessOutputTimestamp = second.payload_as().expect("typed payload");
    let a = DateTime::parse_from_rfc3339(&a.timestamp).expect("RFC 3339");
    let b = DateTime::parse_from_rfc3339(&b.timestamp).expect("RFC 3339");
    assert!(b >= a);
}

#[tokio::test]
async fn test_wait() {
    let test_time = 500;
    let started = Instant::now();
    let outcome = utilities()
        .invoke("wait", json!({ "wait_time_ms": test_time }), &run())
        .await
        .expect("invocation");

    assert!(started.elapsed() >= Duration::from_millis(test_time));
    assert_eq!(outcome.tag, "success");
    let waited: SuccessOutputWait = outcome.payload_as().expect("typed payload");
    assert!(waited.waited_ms >= test_time as f64);
}

#[tokio::test]
async fn test_wait_rejects_negative_and_missing_input() {
    let registry = utilities();

    let result = registry
        .invoke("wait", json!({"wait_time_ms": -1}), &run())
        .await;
    assert!(matches!(
        result,
        Err(RegistryError::InvalidInput { ref field, .. }) if field == "wait_time_ms"
    ));

    let result = registry.invoke("wait", json!({}), &run()).await;
    assert!(matches!(result, Err(RegistryError::InvalidInput { .. })));
}

#[tokio::test]
async fn test_num_cpu() {
    let outcome = utilities()
        .invoke("num_cpu", json!({}), &run())
        .await
        .expect("invocation");
    let cpus: SuccessOutputNumCpu = outcome.payload_as().expect("typed payload");
    assert!(cpus.num_cpu >= 1);
}

#[tokio::test]
async fn test_num_cpu_error_outcome_is_not_a_registry_error() {
    let registry = registry_with_probe(Arc::new(BlindHost)).expect("valid registry");
    let outcome = registry
        .invoke("num_cpu", json!({}), &run())
        .await
        .expect("business errors are outcomes");

    assert_eq!(outcome.tag, "error");
    let error: ErrorOutput = outcome.payload_as().expect("typed payload");
    assert_eq!(error.error, "could not determine CPU count");
}

#[tokio::test]
async fn test_available_memory() {
    let outcome = utilities()
        .invoke("available_memory", json!({}), &run())
        .await
        .expect("invocation");
    assert!(outcome.is_success());
    let memory: SuccessOutputAvailableMemory = outcome.payload_as().expect("typed payload");
    assert!(memory.available_memory > 0);

    let registry = registry_with_probe(Arc::new(BlindHost)).expect("valid registry");
    let outcome = registry
        .invoke("available_memory", json!({}), &run())
        .await
        .expect("invocation");
    assert_eq!(outcome.payload, json!({"available_memory": 4096}));
}

#[tokio::test]
async fn test_unknown_step() {
    let result = utilities().invoke("not_a_step", json!({}), &run()).await;
    assert!(
        matches!(result, Err(RegistryError::UnknownStep(ref id)) if id.as_str() == "not_a_step")
    );
}

#[tokio::test]
async fn test_wait_can_be_bounded_by_the_caller() {
    let result = utilities()
        .invoke_with_timeout(
            "wait",
            json!({"wait_time_ms": 10_000}),
            &run(),
            Duration::from_millis(50),
        )
        .await;
    assert!(matches!(result, Err(RegistryError::Timeout { .. })));
}

#[test]
fn test_schema_document() {
    let document = serde_json::to_value(utilities().schema_document()).expect("serializable");
    let steps = document["steps"].as_array().expect("steps");
    assert_eq!(steps.len(), 5);

    let wait = &steps[2];
    assert_eq!(wait["id"], "wait");
    assert_eq!(wait["name"], "Wait");
    assert_eq!(wait["input"]["fields"][0]["id"], "wait_time_ms");
    assert_eq!(wait["input"]["fields"][0]["min"], 0);

    let memory = &steps[4];
    assert_eq!(memory["outputs"].as_array().map(Vec::len), Some(1));
    assert_eq!(
        memory["outputs"][0]["schema"]["fields"][0]["unit"],
        "bytes"
    );
    assert_eq!(
        memory["outputs"][0]["schema"]["fields"][0]["type"],
        "byte_count"
    );
}

#[test]
fn test_every_declared_output_round_trips() {
    let checked: Vec<(&str, Result<(), SchemaError>)> = vec![
        (
            "SuccessOutputUuid",
            round_trip(&SuccessOutputUuid {
                uuid: uuid::Uuid::new_v4().to_string(),
            }),
        ),
        (
            "SuccessOutputTimestamp",
            round_trip(&SuccessOutputTimestamp {
                timestamp: "2023-11-20T18:34:59.784+01:00".to_string(),
            }),
        ),
        (
            "SuccessOutputWait",
            round_trip(&SuccessOutputWait { waited_ms: 500.25 }),
        ),
        (
            "SuccessOutputNumCpu",
            round_trip(&SuccessOutputNumCpu { num_cpu: 8 }),
        ),
        (
            "SuccessOutputAvailableMemory",
            round_trip(&SuccessOutputAvailableMemory {
                available_memory: 16 * 1024 * 1024 * 1024,
            }),
        ),
        (
            "ErrorOutput",
            round_trip(&ErrorOutput::new("This is an error")),
        ),
    ];

    for definition in utilities().definitions() {
        for output in &definition.outputs {
            let id = output.schema.id();
            let result = checked
                .iter()
                .find(|(record, _)| *record == id)
                .map(|(_, result)| result);
            assert!(
                matches!(result, Some(Ok(()))),
                "output '{}' of step '{}' ({}) does not round-trip: {:?}",
                output.tag,
                definition.id,
                id,
                result
            );
        }
    }
}
