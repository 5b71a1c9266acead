//! Run command implementation
//!
//! Invokes a Piper step through the core invoker and reports the outcome. The
//! tool's output is streamed to the log while it runs; with JSON output the
//! collected [`ExecutionResult`] is printed to stdout once the step finishes.

use crate::cli::OutputFormat;
use crate::commands::StepArgs;
use anyhow::Result;
use piper_core::{ExecutionResult, PiperInvoker};
use tracing::{info, instrument, warn};

/// Signals that the step ran but exited non-zero; `main` exits with this code.
#[derive(Debug)]
pub struct StepExitCode(pub i32);

impl std::fmt::Display for StepExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Piper step exited with code {}", self.0)
    }
}

impl std::error::Error for StepExitCode {}

/// Execute the run command
#[instrument(skip(args), fields(step = %args.step_name))]
pub async fn execute_run(args: StepArgs, output_format: OutputFormat) -> Result<()> {
    let stage = args.stage_context()?;
    let invoker = PiperInvoker::new(args.invoker_config()?);

    let result = invoker
        .invoke(
            &args.step_name,
            Some(&args.flags),
            args.container_id.as_deref(),
            &stage,
        )
        .await?;

    report(&result, output_format)?;

    if result.success() {
        info!("Piper step {} completed", args.step_name);
        Ok(())
    } else {
        warn!(
            "Piper step {} exited with code {}",
            args.step_name, result.exit_code
        );
        Err(StepExitCode(result.exit_code).into())
    }
}

fn report(result: &ExecutionResult, output_format: OutputFormat) -> Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string(result)?),
        OutputFormat::Text => {}
    }
    Ok(())
}
