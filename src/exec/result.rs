// src/exec/result.rs

use crate::errors::ExecError;

/// Outcome of one [`Executor::run`](crate::exec::Executor::run).
///
/// Output is kept whatever happened: a command that timed out or failed still
/// carries what it printed before it stopped.
#[derive(Debug)]
pub struct ExecResult {
    pub error: Option<ExecError>,
    pub stdout: String,
    pub stderr: String,
}

impl ExecResult {
    pub fn success(stdout: String, stderr: String) -> Self {
        Self {
            error: None,
            stdout,
            stderr,
        }
    }

    /// A failure that happened before anything was captured.
    pub fn failed(error: ExecError) -> Self {
        Self {
            error: Some(error),
            stdout: String::new(),
            stderr: String::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    pub fn timed_out(&self) -> bool {
        self.error.as_ref().is_some_and(ExecError::is_timeout)
    }

    /// `(stdout, stderr)` on success, the failure otherwise.
    pub fn into_result(self) -> Result<(String, String), ExecError> {
        match self.error {
            None => Ok((self.stdout, self.stderr)),
            Some(err) => Err(err),
        }
    }
}
