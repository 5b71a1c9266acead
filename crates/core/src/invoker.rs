//! Piper step invocation
//!
//! Builds the exact command line for a Piper step and dispatches it either to
//! the local binary (host mode) or through `docker exec` into a running
//! container (container mode). The stage flag `--stageName <job>` is always
//! appended after the caller's flags.
//!
//! The exit code reported by the executor is returned untouched; deciding
//! whether a non-zero code fails the surrounding CI step is up to the caller.

use crate::config::{
    InvokerConfig, StageContext, CONTAINER_PIPER_PATH, DOCKER_COMMAND, STAGE_NAME_FLAG,
};
use crate::errors::{InvocationError, Result};
use crate::process::{ExecOptions, HostProcessExecutor, OutputListeners, ProcessExecutor};
use serde::Serialize;
use tracing::{debug, info, instrument};

/// Tool argument vector: `[step, ...flags, "--stageName", stage]`.
pub fn build_piper_args(step_name: &str, flags: &[String], stage: &StageContext) -> Vec<String> {
    let mut args = Vec::with_capacity(flags.len() + 3);
    args.push(step_name.to_string());
    args.extend(flags.iter().cloned());
    args.push(STAGE_NAME_FLAG.to_string());
    args.push(stage.stage_name().to_string());
    args
}

/// A fully resolved command, ready to hand to a [`ProcessExecutor`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    /// Shell-quoted rendering of program and arguments, for logs and dry runs
    pub fn command_line(&self) -> String {
        shell_words::join(std::iter::once(&self.program).chain(self.args.iter()))
    }
}

/// Outcome of a Piper invocation
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    /// Exit code exactly as reported by the process (`-1` if killed by a signal)
    pub exit_code: i32,
    /// Everything the tool wrote to stdout, one line per `\n`
    pub output: String,
    /// Everything the tool wrote to stderr, one line per `\n`
    pub error: String,
}

impl ExecutionResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Invokes Piper steps on the host or inside a container
#[derive(Debug)]
pub struct PiperInvoker<E = HostProcessExecutor> {
    config: InvokerConfig,
    executor: E,
}

impl PiperInvoker<HostProcessExecutor> {
    /// Invoker backed by the local tokio process executor
    pub fn new(config: InvokerConfig) -> Self {
        Self::with_executor(config, HostProcessExecutor::new())
    }
}

impl<E: ProcessExecutor> PiperInvoker<E> {
    pub fn with_executor(config: InvokerConfig, executor: E) -> Self {
        Self { config, executor }
    }

    pub fn config(&self) -> &InvokerConfig {
        &self.config
    }

    /// Resolve program and arguments for a step without running anything.
    ///
    /// Without `container_id` the configured local binary is used and a
    /// missing binary path is an error. With `container_id` the step runs via
    /// `docker exec <id> /piper/piper ...`.
    pub fn plan(
        &self,
        step_name: &str,
        flags: Option<&[String]>,
        container_id: Option<&str>,
        stage: &StageContext,
    ) -> Result<Invocation> {
        if step_name.is_empty() {
            return Err(InvocationError::EmptyStepName.into());
        }

        let piper_args = build_piper_args(step_name, flags.unwrap_or_default(), stage);

        let invocation = match container_id {
            None => Invocation {
                program: self
                    .config
                    .require_piper_path()?
                    .to_string_lossy()
                    .into_owned(),
                args: piper_args,
            },
            Some(container_id) => {
                let mut args = Vec::with_capacity(piper_args.len() + 3);
                args.push("exec".to_string());
                args.push(container_id.to_string());
                args.push(CONTAINER_PIPER_PATH.to_string());
                args.extend(piper_args);
                Invocation {
                    program: DOCKER_COMMAND.to_string(),
                    args,
                }
            }
        };

        Ok(invocation)
    }

    /// Run a Piper step and wait for it to finish.
    ///
    /// Output is forwarded to tracing line by line while the tool runs and is
    /// also collected into the returned [`ExecutionResult`]. Spawn failures
    /// propagate as errors; a non-zero exit code does not.
    #[instrument(skip(self, flags, stage), fields(stage = %stage.stage_name()))]
    pub async fn invoke(
        &self,
        step_name: &str,
        flags: Option<&[String]>,
        container_id: Option<&str>,
        stage: &StageContext,
    ) -> Result<ExecutionResult> {
        let invocation = self.plan(step_name, flags, container_id, stage)?;
        info!("Running Piper step: {}", invocation.command_line());

        let mut output = String::new();
        let mut error = String::new();

        let exit_code = {
            let listeners = OutputListeners {
                stdout: Some(Box::new(|line: &str| {
                    info!(stream = "stdout", "{}", line);
                    output.push_str(line);
                    output.push('\n');
                })),
                stderr: Some(Box::new(|line: &str| {
                    info!(stream = "stderr", "{}", line);
                    error.push_str(line);
                    error.push('\n');
                })),
            };

            self.executor
                .execute(
                    &invocation.program,
                    &invocation.args,
                    ExecOptions::with_listeners(listeners),
                )
                .await?
        };

        debug!("Piper step {} finished with exit code {}", step_name, exit_code);

        Ok(ExecutionResult {
            exit_code,
            output,
            error,
        })
    }
}
