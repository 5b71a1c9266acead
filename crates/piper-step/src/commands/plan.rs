//! Plan command implementation
//!
//! Resolves the exact command a step would run and prints it without
//! spawning anything.

use crate::cli::OutputFormat;
use crate::commands::StepArgs;
use anyhow::Result;
use piper_core::PiperInvoker;
use tracing::debug;

/// Execute the plan command
pub fn execute_plan(args: StepArgs, output_format: OutputFormat) -> Result<()> {
    let stage = args.stage_context()?;
    let invoker = PiperInvoker::new(args.invoker_config()?);

    let invocation = invoker.plan(
        &args.step_name,
        Some(&args.flags),
        args.container_id.as_deref(),
        &stage,
    )?;
    debug!("Planned invocation: {:?}", invocation);

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string(&invocation)?),
        OutputFormat::Text => println!("{}", invocation.command_line()),
    }

    Ok(())
}
