// src/exec/mod.rs

//! Process execution layer.
//!
//! Runs a single command under a deadline using `tokio::process::Command`,
//! captures its output and, on success, records a provenance manifest.
//!
//! - [`invocation`] holds the descriptor of one command.
//! - [`runner`] owns the [`Executor`]: spawn, deadline, capture, manifest.
//! - [`output`] drains stdout / stderr into memory.
//! - [`result`] is the uniform [`ExecResult`] returned by every run.
//! - [`backend`] provides the `ExecBackend` seam used by the remote wrapper,
//!   which tests can replace with a fake implementation.

use std::time::Duration;

pub mod backend;
pub mod invocation;
mod output;
pub mod result;
pub mod runner;

pub use backend::ExecBackend;
pub use invocation::Invocation;
pub use result::ExecResult;
pub use runner::{write_manifest, Executor, ManifestOutcome};

/// Deadline applied when an invocation does not set one: 30 minutes.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30 * 60);
