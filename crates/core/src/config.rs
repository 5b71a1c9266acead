//! Invoker configuration and CI stage context
//!
//! Both values are read from the environment at most once, at the boundary
//! (CLI entry point or embedding caller), and then passed explicitly into the
//! invoker. Nothing in the invocation path consults the environment itself.

use crate::errors::{ConfigError, Result};
use std::path::{Path, PathBuf};

/// Environment variable holding the local Piper binary path
pub const PIPER_PATH_ENV: &str = "piperPath";

/// Environment variable holding the current CI job name
pub const JOB_NAME_ENV: &str = "GITHUB_JOB";

/// Container runtime command used for container mode
pub const DOCKER_COMMAND: &str = "docker";

/// Location of the Piper binary inside step containers
pub const CONTAINER_PIPER_PATH: &str = "/piper/piper";

/// Flag carrying the stage name to Piper
pub const STAGE_NAME_FLAG: &str = "--stageName";

/// Configuration for [`crate::invoker::PiperInvoker`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokerConfig {
    piper_path: Option<PathBuf>,
}

impl InvokerConfig {
    /// Create a configuration for host and container invocations.
    ///
    /// Fails with [`ConfigError::EmptyBinaryPath`] when `piper_path` is empty.
    pub fn new(piper_path: impl Into<PathBuf>) -> Result<Self> {
        let piper_path = piper_path.into();
        if piper_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyBinaryPath.into());
        }
        Ok(Self {
            piper_path: Some(piper_path),
        })
    }

    /// Configuration without a local binary.
    ///
    /// Container invocations work as usual; host invocations fail with
    /// [`ConfigError::MissingBinaryPath`] before anything is spawned.
    pub fn container_only() -> Self {
        Self { piper_path: None }
    }

    /// Build from `piperPath`. Unset or empty is an error.
    ///
    /// For library embedders; the `piper-step` CLI reads `piperPath` through
    /// its own argument parsing instead.
    pub fn from_env() -> Result<Self> {
        match std::env::var_os(PIPER_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::new(path),
            _ => Err(ConfigError::MissingBinaryPath {
                env_var: PIPER_PATH_ENV.to_string(),
            }
            .into()),
        }
    }

    /// Configured local binary path, if any
    pub fn piper_path(&self) -> Option<&Path> {
        self.piper_path.as_deref()
    }

    pub(crate) fn require_piper_path(&self) -> Result<&Path> {
        self.piper_path().ok_or_else(|| {
            ConfigError::MissingBinaryPath {
                env_var: PIPER_PATH_ENV.to_string(),
            }
            .into()
        })
    }
}

/// Stage identity of the running CI job, appended to every Piper call as
/// `--stageName <name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageContext {
    stage_name: String,
}

impl StageContext {
    pub fn new(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
        }
    }

    /// Read the stage name from `GITHUB_JOB`. Unset or empty is an error.
    ///
    /// For library embedders; the `piper-step` CLI reads `GITHUB_JOB` through
    /// its own argument parsing instead.
    pub fn from_env() -> Result<Self> {
        match std::env::var(JOB_NAME_ENV) {
            Ok(name) if !name.is_empty() => Ok(Self::new(name)),
            _ => Err(ConfigError::MissingJobName {
                env_var: JOB_NAME_ENV.to_string(),
            }
            .into()),
        }
    }

    pub fn stage_name(&self) -> &str {
        &self.stage_name
    }
}
