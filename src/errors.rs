// src/errors.rs

//! Crate-wide error types.
//!
//! `ExecError` is what ends up in [`ExecResult::error`](crate::exec::ExecResult).
//! Callers usually only care about two questions: did it fail, and was the
//! failure a timeout. [`ExecError::is_timeout`] answers the second one, even
//! when the failure has been wrapped by the remote wrapper.

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExecError {
    #[error("unable to find {name}: {source}")]
    BinaryNotFound {
        name: String,
        #[source]
        source: which::Error,
    },

    #[error("failed to start {}: {source}", binary.display())]
    Launch {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {}: {source}", binary.display())]
    Wait {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} failed: {status}", binary.display())]
    Exit { binary: PathBuf, status: ExitStatus },

    #[error("{} timed out after {after:?}", binary.display())]
    Timeout { binary: PathBuf, after: Duration },

    #[error(
        "unable to run {binary} {} on {host}: {source} - stderr: {stderr} - stdout: {stdout}",
        args.join(" ")
    )]
    Remote {
        binary: String,
        args: Vec<String>,
        host: String,
        #[source]
        source: Box<ExecError>,
        stderr: String,
        stdout: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ExecError {
    /// True if the command was killed because its deadline fired.
    pub fn is_timeout(&self) -> bool {
        match self {
            ExecError::Timeout { .. } => true,
            ExecError::Remote { source, .. } => source.is_timeout(),
            _ => false,
        }
    }

    /// Exit status of the child, if it ran to completion with a non-zero code.
    pub fn exit_status(&self) -> Option<ExitStatus> {
        match self {
            ExecError::Exit { status, .. } => Some(*status),
            ExecError::Remote { source, .. } => source.exit_status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_wrapper_keeps_timeout_visible() {
        let inner = ExecError::Timeout {
            binary: PathBuf::from("/usr/bin/ssh"),
            after: Duration::from_secs(5),
        };
        let wrapped = ExecError::Remote {
            binary: "/usr/bin/date".to_string(),
            args: vec!["-u".to_string()],
            host: "node01".to_string(),
            source: Box::new(inner),
            stderr: String::new(),
            stdout: String::new(),
        };

        assert!(wrapped.is_timeout());
        let msg = wrapped.to_string();
        assert!(msg.contains("unable to run /usr/bin/date -u on node01"), "{msg}");
        assert!(msg.contains("timed out"), "{msg}");
    }

    #[test]
    fn launch_error_is_not_a_timeout() {
        let err = ExecError::Launch {
            binary: PathBuf::from("/nope"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(!err.is_timeout());
        assert!(err.exit_status().is_none());
    }
}
