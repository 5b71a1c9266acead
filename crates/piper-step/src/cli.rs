use crate::commands::{plan, run, StepArgs};
use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::ffi::OsString;
use std::path::PathBuf;

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text format
    Text,
    /// JSON structured format
    Json,
}

/// Log format options
#[derive(Debug, Clone, ValueEnum)]
pub enum LogFormat {
    /// Human-readable text format
    Text,
    /// JSON structured format
    Json,
}

/// Log level options
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    /// Error messages only
    Error,
    /// Warning and error messages
    Warn,
    /// Informational messages and above
    Info,
    /// Debug messages and above
    Debug,
    /// All messages including trace
    Trace,
}

/// Step selection flags shared by `run` and `plan`
#[derive(Debug, Clone, Args)]
pub struct StepOptions {
    /// Piper step to run (e.g. version, mavenBuild)
    pub step_name: String,

    /// Run the step inside this container via `docker exec`
    #[arg(long)]
    pub container_id: Option<String>,

    /// Path to the local Piper binary (required unless --container-id is given).
    /// An empty value counts as unset.
    #[arg(long, env = "piperPath")]
    pub piper_path: Option<OsString>,

    /// Stage name passed to Piper as --stageName (defaults to the CI job name).
    /// An empty value counts as unset.
    #[arg(long, env = "GITHUB_JOB")]
    pub stage_name: Option<String>,

    /// Flags passed verbatim to the step, after `--`
    #[arg(last = true, allow_hyphen_values = true)]
    pub flags: Vec<String>,
}

impl From<StepOptions> for StepArgs {
    fn from(options: StepOptions) -> Self {
        StepArgs {
            step_name: options.step_name,
            flags: options.flags,
            container_id: options.container_id,
            piper_path: options
                .piper_path
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
            stage_name: options.stage_name.filter(|name| !name.is_empty()),
        }
    }
}

/// piper-step subcommands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a Piper step on the host or inside a running container
    Run {
        #[command(flatten)]
        step: StepOptions,

        /// Result output format on stdout
        #[arg(long, value_enum, default_value = "text")]
        output_format: OutputFormat,
    },
    /// Print the command a Piper step would run, without running it
    Plan {
        #[command(flatten)]
        step: StepOptions,

        /// Plan output format on stdout
        #[arg(long, value_enum, default_value = "text")]
        output_format: OutputFormat,
    },
}

/// Run Piper steps with the CI stage name attached
#[derive(Debug, Parser)]
#[command(name = "piper-step", version)]
pub struct Cli {
    /// Log format (text or json)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,

    /// Log level
    #[arg(long, global = true, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Initialize logging from the global options, then run the subcommand.
    pub async fn dispatch(self) -> Result<()> {
        let log_format = match self.log_format {
            Some(LogFormat::Text) => Some("text"),
            Some(LogFormat::Json) => Some("json"),
            None => None, // Let logging module check environment variable
        };

        let log_level = match self.log_level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };

        if std::env::var_os(piper_core::logging::LOG_FILTER_ENV).is_none()
            && std::env::var_os("RUST_LOG").is_none()
        {
            std::env::set_var(
                "RUST_LOG",
                format!("piper_step={},piper_core={}", log_level, log_level),
            );
        }
        piper_core::logging::init(log_format)?;

        tracing::debug!("CLI initialized with log level: {}", log_level);

        match self.command {
            Commands::Run {
                step,
                output_format,
            } => run::execute_run(step.into(), output_format).await,
            Commands::Plan {
                step,
                output_format,
            } => plan::execute_plan(step.into(), output_format),
        }
    }
}
