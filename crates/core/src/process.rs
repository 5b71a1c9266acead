//! Process execution seam
//!
//! The invoker never spawns processes itself; it hands a program, an argument
//! vector and a set of output listeners to a [`ProcessExecutor`]. The default
//! [`HostProcessExecutor`] runs the program with tokio and feeds each line of
//! stdout/stderr to the listeners as soon as it is read.

use crate::errors::{ProcessError, Result};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tracing::{debug, instrument};

/// Callback receiving one line of process output (without the line terminator)
pub type LineListener<'a> = Box<dyn FnMut(&str) + Send + 'a>;

/// Listeners for the two output streams of a process
#[derive(Default)]
pub struct OutputListeners<'a> {
    pub stdout: Option<LineListener<'a>>,
    pub stderr: Option<LineListener<'a>>,
}

impl OutputListeners<'_> {
    pub fn emit_stdout(&mut self, line: &str) {
        if let Some(listener) = self.stdout.as_mut() {
            listener(line);
        }
    }

    pub fn emit_stderr(&mut self, line: &str) {
        if let Some(listener) = self.stderr.as_mut() {
            listener(line);
        }
    }

    /// Whether both streams have a listener attached
    pub fn is_complete(&self) -> bool {
        self.stdout.is_some() && self.stderr.is_some()
    }
}

impl std::fmt::Debug for OutputListeners<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputListeners")
            .field("stdout", &self.stdout.is_some())
            .field("stderr", &self.stderr.is_some())
            .finish()
    }
}

/// Options for a single process execution
#[derive(Debug, Default)]
pub struct ExecOptions<'a> {
    pub listeners: OutputListeners<'a>,
}

impl<'a> ExecOptions<'a> {
    pub fn with_listeners(listeners: OutputListeners<'a>) -> Self {
        Self { listeners }
    }
}

/// Runs an external program to completion and reports its exit code.
///
/// Implementations must stream output to `options.listeners` while the process
/// runs and must not interpret the exit code. Failing to start the process is
/// an error; exiting non-zero is not.
#[allow(async_fn_in_trait)]
pub trait ProcessExecutor {
    async fn execute(&self, program: &str, args: &[String], options: ExecOptions<'_>)
        -> Result<i32>;
}

impl<T: ProcessExecutor> ProcessExecutor for &T {
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        options: ExecOptions<'_>,
    ) -> Result<i32> {
        (*self).execute(program, args, options).await
    }
}

/// Executes programs on the local host with tokio
#[derive(Debug, Clone, Default)]
pub struct HostProcessExecutor;

impl HostProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

fn decode_line(segment: &[u8]) -> String {
    let line = String::from_utf8_lossy(segment);
    line.strip_suffix('\r').unwrap_or(&line).to_string()
}

impl ProcessExecutor for HostProcessExecutor {
    #[instrument(skip(self, args, options))]
    async fn execute(
        &self,
        program: &str,
        args: &[String],
        mut options: ExecOptions<'_>,
    ) -> Result<i32> {
        debug!("Spawning process: {} {:?}", program, args);

        let io_error = |source: std::io::Error| ProcessError::Io {
            program: program.to_string(),
            source,
        };

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ProcessError::Spawn {
                program: program.to_string(),
                source,
            })?;

        let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
            return Err(io_error(std::io::Error::other("process output was not captured")).into());
        };

        // Segments are split on '\n' only and decoded lossily so that
        // non-UTF-8 output never aborts the run.
        let mut stdout_segments = BufReader::new(stdout).split(b'\n');
        let mut stderr_segments = BufReader::new(stderr).split(b'\n');
        let mut stdout_open = true;
        let mut stderr_open = true;

        while stdout_open || stderr_open {
            tokio::select! {
                segment = stdout_segments.next_segment(), if stdout_open => {
                    match segment.map_err(io_error)? {
                        Some(bytes) => options.listeners.emit_stdout(&decode_line(&bytes)),
                        None => stdout_open = false,
                    }
                }
                segment = stderr_segments.next_segment(), if stderr_open => {
                    match segment.map_err(io_error)? {
                        Some(bytes) => options.listeners.emit_stderr(&decode_line(&bytes)),
                        None => stderr_open = false,
                    }
                }
            }
        }

        let status = child.wait().await.map_err(io_error)?;
        let exit_code = status.code().unwrap_or(-1);
        debug!("Process {} exited with code {}", program, exit_code);

        Ok(exit_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::PiperError;
    use std::sync::{Arc, Mutex};

    type Captured = Arc<Mutex<Vec<String>>>;

    fn capturing_listeners() -> (OutputListeners<'static>, Captured, Captured) {
        let stdout: Captured = Arc::default();
        let stderr: Captured = Arc::default();
        let out = Arc::clone(&stdout);
        let err = Arc::clone(&stderr);
        let listeners = OutputListeners {
            stdout: Some(Box::new(move |line: &str| out.lock().unwrap().push(line.to_string()))),
            stderr: Some(Box::new(move |line: &str| err.lock().unwrap().push(line.to_string()))),
        };
        (listeners, stdout, stderr)
    }

    #[test]
    fn test_decode_line_strips_carriage_return() {
        assert_eq!(decode_line(b"hello\r"), "hello");
        assert_eq!(decode_line(b"hello"), "hello");
        assert_eq!(decode_line(b""), "");
    }

    #[test]
    fn test_listeners_default_is_incomplete() {
        let listeners = OutputListeners::default();
        assert!(!listeners.is_complete());
        assert_eq!(
            format!("{:?}", listeners),
            "OutputListeners { stdout: false, stderr: false }"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_host_executor_streams_both_streams() {
        let (listeners, stdout, stderr) = capturing_listeners();
        let args = vec![
            "-c".to_string(),
            "echo first; echo oops >&2; echo second".to_string(),
        ];

        let code = HostProcessExecutor::new()
            .execute("sh", &args, ExecOptions::with_listeners(listeners))
            .await
            .unwrap();

        assert_eq!(code, 0);
        assert_eq!(*stdout.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(*stderr.lock().unwrap(), vec!["oops"]);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_host_executor_passes_exit_code_through() {
        let args = vec!["-c".to_string(), "exit 7".to_string()];
        let code = HostProcessExecutor::new()
            .execute("sh", &args, ExecOptions::default())
            .await
            .unwrap();
        assert_eq!(code, 7);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_host_executor_passes_args_verbatim() {
        let (listeners, stdout, _stderr) = capturing_listeners();
        let args = vec![
            "-c".to_string(),
            "for a in \"$@\"; do echo \"$a\"; done".to_string(),
            "sh".to_string(),
            "--globalSettingsFile".to_string(),
            "global settings.xml".to_string(),
        ];

        HostProcessExecutor::new()
            .execute("sh", &args, ExecOptions::with_listeners(listeners))
            .await
            .unwrap();

        assert_eq!(
            *stdout.lock().unwrap(),
            vec!["--globalSettingsFile", "global settings.xml"]
        );
    }

    #[tokio::test]
    async fn test_host_executor_spawn_failure() {
        let err = HostProcessExecutor::new()
            .execute("/nonexistent/piper-binary", &[], ExecOptions::default())
            .await
            .unwrap_err();

        match err {
            PiperError::Process(ProcessError::Spawn { program, .. }) => {
                assert_eq!(program, "/nonexistent/piper-binary");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
