// src/exec/invocation.rs

//! The descriptor of a single command execution.

use std::path::PathBuf;
use std::time::Duration;

use crate::exec::DEFAULT_TIMEOUT;
use crate::manifest::ManifestOptions;

/// Everything the executor needs to run one command.
///
/// Built by the caller with the builder methods below and handed to
/// [`Executor::run`](crate::exec::Executor::run) by reference; the executor
/// never mutates it.
///
/// ```
/// use std::time::Duration;
/// use provexec::exec::Invocation;
/// use provexec::manifest::ManifestOptions;
///
/// let inv = Invocation::new("/usr/bin/env")
///     .env("TOTO=titi")
///     .timeout(Duration::from_secs(5))
///     .manifest(ManifestOptions::new("/tmp/prov").name("env"));
/// assert_eq!(inv.effective_timeout(), Duration::from_secs(5));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    /// Binary to execute. Bare names go through the OS `PATH` lookup.
    pub binary: PathBuf,

    pub args: Vec<String>,

    /// Working directory of the child. `None` inherits the caller's.
    pub exec_dir: Option<PathBuf>,

    /// `KEY=VALUE` entries layered on top of the inherited environment.
    ///
    /// Applied in order, so for a repeated key the last entry wins.
    pub env: Vec<String>,

    /// Deadline for the child. `None` means [`DEFAULT_TIMEOUT`].
    pub timeout: Option<Duration>,

    /// Manifest to produce after a successful run, if any.
    pub manifest: Option<ManifestOptions>,
}

impl Invocation {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn exec_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.exec_dir = Some(dir.into());
        self
    }

    pub fn env(mut self, entry: impl Into<String>) -> Self {
        self.env.push(entry.into());
        self
    }

    pub fn envs<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.env.extend(entries.into_iter().map(Into::into));
        self
    }

    /// Set the deadline. A zero duration means "use the default".
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = if timeout.is_zero() { None } else { Some(timeout) };
        self
    }

    pub fn manifest(mut self, manifest: ManifestOptions) -> Self {
        self.manifest = Some(manifest);
        self
    }

    pub fn effective_timeout(&self) -> Duration {
        match self.timeout {
            Some(t) if !t.is_zero() => t,
            _ => DEFAULT_TIMEOUT,
        }
    }

    /// Directory the child runs in: `exec_dir`, or the caller's current one.
    pub fn effective_exec_dir(&self) -> PathBuf {
        match &self.exec_dir {
            Some(dir) if !dir.as_os_str().is_empty() => dir.clone(),
            _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }
}

/// Split a `KEY=VALUE` entry. Entries without `=` or with an empty key are
/// rejected.
pub fn split_env_entry(entry: &str) -> Option<(&str, &str)> {
    match entry.split_once('=') {
        Some((key, value)) if !key.is_empty() => Some((key, value)),
        _ => None,
    }
}
