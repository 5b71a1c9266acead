//! Error types and handling
//!
//! Each concern gets its own error enum (configuration, process execution,
//! invocation input) and all of them are wrapped in [`PiperError`] for unified
//! handling by callers.
//!
//! A non-zero exit code from the Piper binary is never represented here: it is
//! ordinary result data carried by [`crate::invoker::ExecutionResult`].

use thiserror::Error;

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Host-mode invocation requested but no binary path was configured
    #[error("Piper binary path is not configured (set {env_var})")]
    MissingBinaryPath { env_var: String },

    /// Binary path was supplied but is empty
    #[error("Piper binary path must not be empty")]
    EmptyBinaryPath,

    /// CI job name is not available to derive the stage name from
    #[error("CI job name is not set (expected {env_var})")]
    MissingJobName { env_var: String },
}

/// Process execution errors
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The process could not be started (binary missing, permission denied, ...)
    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading output from or waiting on a running process failed
    #[error("I/O error while running '{program}': {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Invalid input handed to the invoker
#[derive(Error, Debug)]
pub enum InvocationError {
    /// Step name is empty
    #[error("Step name must not be empty")]
    EmptyStepName,
}

/// Main error enum wrapping all domain-specific errors
#[derive(Error, Debug)]
pub enum PiperError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Process execution errors
    #[error("Process error: {0}")]
    Process(#[from] ProcessError),

    /// Invalid invocation input
    #[error("Invocation error: {0}")]
    Invocation(#[from] InvocationError),
}

/// Convenience type alias for Results with PiperError
pub type Result<T> = std::result::Result<T, PiperError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_config_error_display() {
        let error = ConfigError::MissingBinaryPath {
            env_var: "piperPath".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "Piper binary path is not configured (set piperPath)"
        );

        let error = ConfigError::EmptyBinaryPath;
        assert_eq!(format!("{}", error), "Piper binary path must not be empty");

        let error = ConfigError::MissingJobName {
            env_var: "GITHUB_JOB".to_string(),
        };
        assert_eq!(
            format!("{}", error),
            "CI job name is not set (expected GITHUB_JOB)"
        );
    }

    #[test]
    fn test_process_error_display() {
        let error = ProcessError::Spawn {
            program: "./piper".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such file"),
        };
        assert_eq!(
            format!("{}", error),
            "Failed to spawn './piper': No such file"
        );
    }

    #[test]
    fn test_piper_error_from_domain_errors() {
        let error: PiperError = ConfigError::EmptyBinaryPath.into();
        assert!(matches!(error, PiperError::Config(_)));

        let error: PiperError = InvocationError::EmptyStepName.into();
        assert!(matches!(error, PiperError::Invocation(_)));

        let error: PiperError = ProcessError::Io {
            program: "docker".to_string(),
            source: std::io::Error::other("broken pipe"),
        }
        .into();
        assert!(matches!(error, PiperError::Process(_)));
    }

    #[test]
    fn test_anyhow_conversions() {
        let error = PiperError::Config(ConfigError::MissingBinaryPath {
            env_var: "piperPath".to_string(),
        });
        let anyhow_error = anyhow::Error::from(error);
        assert!(anyhow_error.to_string().contains("Configuration error"));
    }

    #[test]
    fn test_error_source_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error = PiperError::Process(ProcessError::Spawn {
            program: "./piper".to_string(),
            source: io_error,
        });

        assert!(error.source().is_some());
        if let Some(source) = error.source() {
            assert!(source.source().is_some()); // The underlying io::Error
        }
    }
}
