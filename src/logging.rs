// src/logging.rs

//! Diagnostics go to stderr; stdout only ever carries the child's output.
//!
//! `PROVEXEC_LOG` takes `EnvFilter` directives (`debug`,
//! `provexec::exec=trace,info`, ...). `--log-level` replaces the default
//! level; per-target directives from the environment stay in force.

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable holding the filter directives.
pub const LOG_ENV: &str = "PROVEXEC_LOG";

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(apply_cli_level(env_filter, cli_level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

fn apply_cli_level(filter: EnvFilter, cli_level: Option<LogLevel>) -> EnvFilter {
    match cli_level {
        Some(level) => filter.add_directive(LevelFilter::from(level).into()),
        None => filter,
    }
}
