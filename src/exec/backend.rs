// src/exec/backend.rs

//! Pluggable execution backend.
//!
//! The remote wrapper talks to an `ExecBackend` instead of an [`Executor`]
//! directly. Production code passes the real executor; tests can pass a fake
//! that records the invocations it was given and returns canned results
//! without spawning anything.

use std::future::Future;
use std::pin::Pin;

use crate::exec::{ExecResult, Executor, Invocation};

/// Anything that can run an [`Invocation`] and produce an [`ExecResult`].
pub trait ExecBackend: Send + Sync {
    fn execute<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = ExecResult> + Send + 'a>>;
}

impl ExecBackend for Executor {
    fn execute<'a>(
        &'a self,
        invocation: &'a Invocation,
    ) -> Pin<Box<dyn Future<Output = ExecResult> + Send + 'a>> {
        Box::pin(self.run(invocation))
    }
}
