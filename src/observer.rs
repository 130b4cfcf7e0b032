// src/observer.rs

//! Diagnostic side channel for the executor.
//!
//! Messages such as "manifest already exists" or "failed to create manifest
//! directory" are never part of an [`ExecResult`](crate::exec::ExecResult).
//! They go to a [`Recorder`] handed to the executor instead, so tests can
//! assert on them without capturing global log output.

use std::fmt::Debug;
use std::sync::{Arc, Mutex};

use tracing::info;

pub trait Recorder: Send + Sync + Debug {
    fn record(&self, message: &str);
}

/// Default recorder: forwards every message to `tracing` at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingRecorder;

impl Recorder for TracingRecorder {
    fn record(&self, message: &str) {
        info!(target: "provexec", "{message}");
    }
}

/// Keeps messages in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecorder {
    messages: Arc<Mutex<Vec<String>>>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    /// True if any recorded message contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.contains(needle))
    }
}

impl Recorder for MemoryRecorder {
    fn record(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}
