mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use std::io::{self, Read};
use std::path::Path;
use std::time::Duration;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utilsteps_core::{Registry, RunContext};

use cli::{Cli, Commands};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout carries the step outcome.
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let registry = utilsteps::registry().context("failed to build step registry")?;

    match cli.command {
        Commands::Schema => {
            let document = registry.schema_document().to_json_pretty()?;
            println!("{}", document);
        }
        Commands::List => {
            for definition in registry.definitions() {
                println!("{:<18} {}", definition.id, definition.name);
            }
        }
        Commands::Run {
            step,
            input,
            run_id,
            timeout_ms,
        } => {
            let raw_input = match input {
                Some(path) => read_input(&path)?,
                None => Value::Null,
            };
            let run = run_id.map(RunContext::new).unwrap_or_default();
            run_step(&registry, &step, raw_input, &run, timeout_ms).await?;
        }
    }

    Ok(())
}

async fn run_step(
    registry: &Registry,
    step: &str,
    raw_input: Value,
    run: &RunContext,
    timeout_ms: Option<u64>,
) -> Result<()> {
    let outcome = match timeout_ms {
        Some(ms) => {
            registry
                .invoke_with_timeout(step, raw_input, run, Duration::from_millis(ms))
                .await
        }
        None => registry.invoke(step, raw_input, run).await,
    }
    .with_context(|| format!("step '{}' failed (run_id: {})", step, run.run_id()))?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

fn read_input(path: &Path) -> Result<Value> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read input from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read input file {:?}", path))?
    };
    parse_input(&content).with_context(|| format!("failed to parse input {:?}", path))
}

/// Parses a YAML or JSON input document. Blank input is the empty record.
fn parse_input(content: &str) -> Result<Value> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_yaml::from_str(content)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_yaml_input() {
        let value = parse_input("wait_time_ms: 500\n").expect("valid yaml");
        assert_eq!(value, json!({"wait_time_ms": 500}));
    }

    #[test]
    fn test_parse_json_input() {
        let value = parse_input(r#"{"wait_time_ms": 5}"#).expect("valid json");
        assert_eq!(value, json!({"wait_time_ms": 5}));
    }

    #[test]
    fn test_parse_blank_input() {
        assert_eq!(parse_input("  \n").expect("blank"), Value::Null);
    }

    #[test]
    fn test_parse_invalid_input() {
        assert!(parse_input("wait_time_ms: [").is_err());
    }

    #[tokio::test]
    async fn test_run_step_reports_unknown_step() {
        let registry = utilsteps::registry().expect("valid registry");
        let err = run_step(
            &registry,
            "not_a_step",
            Value::Null,
            &RunContext::new("plugin_ci"),
            None,
        )
        .await
        .expect_err("unknown step");
        assert!(format!("{:#}", err).contains("Unknown step: not_a_step"));
    }
}
