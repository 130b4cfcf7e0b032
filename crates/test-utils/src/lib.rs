pub mod commands;
pub mod fake_backend;

use std::sync::Once;
use tracing_subscriber::{fmt, EnvFilter};

pub use commands::{print_then_sleep, shell, shell_with_timeout};
pub use fake_backend::FakeBackend;

static INIT: Once = Once::new();

/// Route `tracing` output through the test harness capture.
///
/// Filter directives come from `PROVEXEC_LOG`, as for the binary, e.g.
/// `PROVEXEC_LOG=provexec::exec=debug cargo test`. Defaults to `info`.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env(provexec::logging::LOG_ENV)
            .unwrap_or_else(|_| EnvFilter::new("info"));

        // A global subscriber may already be installed.
        let _ = fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .try_init();
    });
}

/// Fail the test if `f` does not finish within 30 seconds.
pub async fn with_timeout<F, T>(f: F) -> T
where
    F: std::future::Future<Output = T>,
{
    tokio::time::timeout(std::time::Duration::from_secs(30), f)
        .await
        .expect("test did not finish within 30 seconds")
}
