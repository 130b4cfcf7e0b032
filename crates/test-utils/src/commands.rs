//! Ready-made invocations for tests.
//!
//! Everything goes through `/bin/sh -c` so tests never have to write and then
//! immediately execute a script file.

use std::time::Duration;

use provexec::exec::Invocation;

pub const SHELL: &str = "/bin/sh";

/// `/bin/sh -c <script>`
pub fn shell(script: &str) -> Invocation {
    Invocation::new(SHELL).arg("-c").arg(script)
}

/// Prints `marker` on stdout, then sleeps for `secs` seconds.
pub fn print_then_sleep(marker: &str, secs: u64) -> Invocation {
    shell(&format!("echo {marker}; sleep {secs}"))
}

/// `shell(script)` with a deadline.
pub fn shell_with_timeout(script: &str, timeout: Duration) -> Invocation {
    shell(script).timeout(timeout)
}
