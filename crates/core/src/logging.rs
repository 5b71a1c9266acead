//! Logging setup
//!
//! Structured logging through tracing-subscriber, either as human-readable
//! text or as JSON. Format and filter are chosen at runtime from arguments and
//! environment variables.
//!
//! All logging output goes to stderr; stdout is reserved for command results.

use anyhow::Result;
use std::{io, sync::Once};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Environment variable selecting the log format ("json" or "text")
pub const LOG_FORMAT_ENV: &str = "PIPER_STEP_LOG_FORMAT";

/// Environment variable holding the log filter directive
pub const LOG_FILTER_ENV: &str = "PIPER_STEP_LOG";

/// Initialize the logging system.
///
/// Safe to call more than once; only the first call installs a subscriber.
///
/// ## Arguments
///
/// * `format` - `None` or `"text"` for text output, `"json"` for JSON. When
///   `None`, `PIPER_STEP_LOG_FORMAT` is consulted.
///
/// ## Environment Variables
///
/// * `PIPER_STEP_LOG_FORMAT` - log output format
/// * `PIPER_STEP_LOG` - filter directive
/// * `RUST_LOG` - fallback filter directive
///
/// ## Example
///
/// ```rust
/// use piper_core::logging;
///
/// logging::init(None).expect("Failed to initialize logging");
/// ```
pub fn init(format: Option<&str>) -> Result<()> {
    INIT.call_once(|| {
        let filter = create_env_filter();

        let env_format = std::env::var(LOG_FORMAT_ENV).ok();
        let effective_format = format.or(env_format.as_deref()).unwrap_or("text");

        match effective_format {
            "json" => {
                tracing_subscriber::registry()
                    .with(
                        fmt::layer()
                            .json()
                            .with_target(true)
                            .with_writer(io::stderr),
                    )
                    .with(filter)
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(fmt::layer().with_target(true).with_writer(io::stderr))
                    .with(filter)
                    .init();
            }
        }

        tracing::debug!("Logging initialized with format: {}", effective_format);
    });

    Ok(())
}

fn create_env_filter() -> EnvFilter {
    if let Ok(directive) = std::env::var(LOG_FILTER_ENV) {
        EnvFilter::try_new(&directive).unwrap_or_else(|_| {
            tracing::warn!(
                "Invalid {} specification '{}', using default 'info'",
                LOG_FILTER_ENV,
                directive
            );
            EnvFilter::new("info")
        })
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

/// Check if logging has been initialized
pub fn is_initialized() -> bool {
    INIT.is_completed()
}
