// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Command-line arguments for `provexec`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "provexec",
    version,
    about = "Run commands under a deadline and record what was run.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `provexec.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PROVEXEC_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Clone, Subcommand)]
pub enum CliCommand {
    /// Run a local command.
    Run(RunArgs),

    /// Run a command on a remote host through the remote shell.
    Remote(RemoteArgs),

    /// Summarize an experiment results log.
    Results {
        /// Results file; a missing file counts as no results.
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Deadline in seconds (0 = default of 30 minutes).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Working directory for the command.
    #[arg(long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Extra environment entry, `KEY=VALUE`. Repeatable.
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Write a manifest into this directory after a successful run.
    #[arg(long, value_name = "DIR")]
    pub manifest_dir: Option<PathBuf>,

    /// Manifest name, without the `.MANIFEST` suffix.
    #[arg(long, value_name = "NAME")]
    pub manifest_name: Option<String>,

    /// Extra manifest line. Repeatable.
    #[arg(long = "annotate", value_name = "LINE")]
    pub annotations: Vec<String>,

    /// Extra file to hash into the manifest. Repeatable.
    #[arg(long = "hash", value_name = "FILE")]
    pub hashed_files: Vec<PathBuf>,

    /// Binary to run.
    pub binary: PathBuf,

    /// Arguments for the binary.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct RemoteArgs {
    /// Environment entry for the local shell client, `KEY=VALUE`. Repeatable.
    #[arg(long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Host to run on.
    pub host: String,

    /// Binary path on the remote host.
    pub binary: String,

    /// Arguments for the remote binary.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
