// src/remote/mod.rs

//! Running a command on another host through a remote shell.
//!
//! The wrapper does no process management of its own. It resolves the shell
//! client (`ssh` by default), rewrites the request into
//! `<shell> <host> <binary> <args...>` and hands that to an
//! [`ExecBackend`]. Environment entries are set on the local shell client
//! process; whether they reach the remote side is up to the client.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::ExecError;
use crate::exec::{ExecBackend, ExecResult, Executor, Invocation};

/// Shell client used when none is configured.
pub const DEFAULT_REMOTE_SHELL: &str = "ssh";

/// Remote invocation wrapper around an [`ExecBackend`].
#[derive(Clone)]
pub struct RemoteShell {
    program: String,
    backend: Arc<dyn ExecBackend>,
}

impl Default for RemoteShell {
    fn default() -> Self {
        Self::new(Arc::new(Executor::new()))
    }
}

impl RemoteShell {
    pub fn new(backend: Arc<dyn ExecBackend>) -> Self {
        Self {
            program: DEFAULT_REMOTE_SHELL.to_string(),
            backend,
        }
    }

    /// Use another shell client, by name (looked up in `PATH`) or by path.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Locate the shell client binary.
    pub fn resolve(&self) -> Result<PathBuf, ExecError> {
        which::which(&self.program).map_err(|source| ExecError::BinaryNotFound {
            name: self.program.clone(),
            source,
        })
    }

    /// The invocation that runs `binary args...` on `host`.
    pub fn invocation(
        shell: PathBuf,
        host: &str,
        binary: &str,
        args: &[String],
        env: &[String],
    ) -> Invocation {
        Invocation::new(shell)
            .arg(host)
            .arg(binary)
            .args(args.iter().cloned())
            .envs(env.iter().cloned())
    }

    /// Run `binary` with `args` on `host`.
    ///
    /// If the shell client cannot be found nothing is launched. Any failure is
    /// wrapped with the host, the target command and the captured output.
    pub async fn exec_cmd(
        &self,
        host: &str,
        binary: &str,
        args: &[String],
        env: &[String],
    ) -> ExecResult {
        let shell = match self.resolve() {
            Ok(path) => path,
            Err(err) => {
                debug!(program = %self.program, error = %err, "remote shell not found");
                return ExecResult::failed(err);
            }
        };

        info!(host, binary, shell = %shell.display(), "running remote command");
        let inv = Self::invocation(shell, host, binary, args, env);
        let ExecResult {
            error,
            stdout,
            stderr,
        } = self.backend.execute(&inv).await;

        let error = error.map(|source| ExecError::Remote {
            binary: binary.to_string(),
            args: args.to_vec(),
            host: host.to_string(),
            source: Box::new(source),
            stderr: stderr.clone(),
            stdout: stdout.clone(),
        });
        ExecResult {
            error,
            stdout,
            stderr,
        }
    }
}

/// Run `binary` on `host` over `ssh` with the default executor.
pub async fn exec_cmd(host: &str, binary: &str, args: &[String], env: &[String]) -> ExecResult {
    RemoteShell::default().exec_cmd(host, binary, args, env).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invocation_puts_host_then_binary_then_args() {
        let inv = RemoteShell::invocation(
            PathBuf::from("/usr/bin/ssh"),
            "node07",
            "/usr/bin/date",
            &["-u".to_string(), "+%s".to_string()],
            &["TOTO=titi".to_string()],
        );

        assert_eq!(inv.binary, PathBuf::from("/usr/bin/ssh"));
        assert_eq!(inv.args, vec!["node07", "/usr/bin/date", "-u", "+%s"]);
        assert_eq!(inv.env, vec!["TOTO=titi"]);
        assert!(inv.manifest.is_none());
        assert!(inv.timeout.is_none());
    }

    #[test]
    fn unknown_program_fails_to_resolve() {
        let shell = RemoteShell::default().with_program("provexec-no-such-remote-shell");
        assert_eq!(shell.program(), "provexec-no-such-remote-shell");
        let err = shell.resolve().unwrap_err();
        assert!(matches!(err, ExecError::BinaryNotFound { .. }));
        assert!(
            err.to_string()
                .contains("unable to find provexec-no-such-remote-shell"),
            "{err}"
        );
    }
}
