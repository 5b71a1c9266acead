//! Core library for piper-step
//!
//! Builds and runs Piper step invocations, either against a local Piper binary
//! or inside a running container via `docker exec`. Configuration, error
//! handling and logging setup shared with the CLI live here as well.

pub mod config;
pub mod errors;
pub mod invoker;
pub mod logging;
pub mod process;

pub use config::{InvokerConfig, StageContext};
pub use invoker::{ExecutionResult, Invocation, PiperInvoker};

/// Get the version of the core library
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
