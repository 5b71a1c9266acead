use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

#[tokio::main]
async fn main() -> Result<()> {
    let parsed = cli::Cli::parse();

    match parsed.dispatch().await {
        Ok(()) => Ok(()),
        Err(err) => {
            // A step that ran but exited non-zero: mirror its exit code
            if let Some(step_exit) = err.downcast_ref::<commands::run::StepExitCode>() {
                std::process::exit(step_exit.0);
            }

            Err(err)
        }
    }
}
