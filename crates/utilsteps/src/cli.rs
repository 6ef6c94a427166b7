use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Utility steps: UUIDs, timestamps, waits and host facts
#[derive(Debug, Parser)]
#[command(name = "utilsteps")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the schema of every step as JSON
    Schema,

    /// List the available steps
    List,

    /// Run a single step and print its outcome as JSON
    Run {
        /// The step id to run
        step: String,

        /// Input file (YAML or JSON), or `-` for stdin. Defaults to an empty input
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Correlation id for this run (default: a random UUID)
        #[arg(long)]
        run_id: Option<String>,

        /// Give up if the step has not finished after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "utilsteps",
            "run",
            "wait",
            "--input",
            "wait.yaml",
            "--run-id",
            "plugin_ci",
            "--timeout-ms",
            "1000",
        ])
        .expect("valid arguments");

        match cli.command {
            Commands::Run {
                step,
                input,
                run_id,
                timeout_ms,
            } => {
                assert_eq!(step, "wait");
                assert_eq!(input, Some(PathBuf::from("wait.yaml")));
                assert_eq!(run_id.as_deref(), Some("plugin_ci"));
                assert_eq!(timeout_ms, Some(1000));
            }
            other => panic!("Unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_run_requires_step() {
        assert!(Cli::try_parse_from(["utilsteps", "run"]).is_err());
    }

    #[test]
    fn test_parse_schema() {
        let cli = Cli::try_parse_from(["utilsteps", "schema"]).expect("valid arguments");
        assert!(matches!(cli.command, Commands::Schema));
    }
}
