//! Command implementations
//!
//! This module contains implementations for all CLI subcommands.

pub mod plan;
pub mod run;

use anyhow::Result;
use piper_core::config::{InvokerConfig, StageContext, JOB_NAME_ENV};
use piper_core::errors::{ConfigError, PiperError};
use std::path::PathBuf;

/// Step selection shared by `run` and `plan`
#[derive(Debug, Clone)]
pub struct StepArgs {
    /// Piper step name
    pub step_name: String,
    /// Flags passed verbatim after the step name
    pub flags: Vec<String>,
    /// Target container for `docker exec`; host mode when absent
    pub container_id: Option<String>,
    /// Local Piper binary (from --piper-path or piperPath)
    pub piper_path: Option<PathBuf>,
    /// Stage name (from --stage-name or GITHUB_JOB)
    pub stage_name: Option<String>,
}

impl StepArgs {
    /// Build the invoker configuration. Without a binary path only container
    /// mode is usable.
    pub fn invoker_config(&self) -> Result<InvokerConfig> {
        match self.piper_path.as_deref().filter(|path| !path.as_os_str().is_empty()) {
            Some(path) => Ok(InvokerConfig::new(path)?),
            None => Ok(InvokerConfig::container_only()),
        }
    }

    pub fn stage_context(&self) -> Result<StageContext> {
        match self.stage_name.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => Ok(StageContext::new(name)),
            None => Err(PiperError::from(ConfigError::MissingJobName {
                env_var: JOB_NAME_ENV.to_string(),
            })
            .into()),
        }
    }
}
