#![allow(dead_code)]

use std::path::PathBuf;

pub use provexec_test_utils::{
    init_tracing, print_then_sleep, shell, shell_with_timeout, with_timeout,
};

/// Resolve `name` in `PATH`, or `None` so the caller can skip.
pub fn lookup(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}
