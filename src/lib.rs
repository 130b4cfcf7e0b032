// src/lib.rs

//! Run external programs under a deadline and record provenance manifests.
//!
//! - [`exec`]: the bounded executor and its descriptor / result types.
//! - [`manifest`]: manifest naming, record layout, hashing and writing.
//! - [`remote`]: the remote-shell wrapper built on top of the executor.
//! - [`results`]: reader for experiment result logs.

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod manifest;
pub mod observer;
pub mod remote;
pub mod results;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tracing::debug;

use crate::cli::{CliArgs, CliCommand, RemoteArgs, RunArgs};
use crate::config::{load_or_default, Config};
use crate::errors::ExecError;
use crate::exec::{ExecResult, Executor, Invocation};
use crate::manifest::ManifestOptions;
use crate::remote::RemoteShell;

/// Exit code used when the command hit its deadline.
pub const EXIT_TIMEOUT: i32 = 124;

/// High-level entry point used by `main.rs`.
///
/// Returns the process exit code: 0 on success, [`EXIT_TIMEOUT`] when the
/// deadline fired, the child's own code when it exited non-zero and 1 for
/// any other failure.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(args.config.as_deref())?;

    match args.command {
        CliCommand::Run(run) => {
            let inv = build_invocation(&cfg, run);
            debug!(?inv, "built invocation");
            let res = Executor::new().run(&inv).await;
            Ok(report(res))
        }
        CliCommand::Remote(remote) => {
            let res = run_remote(&cfg, remote).await;
            Ok(report(res))
        }
        CliCommand::Results { file } => {
            let loaded = results::load(&file)?;
            let summary = results::summarize(&loaded);
            println!(
                "{}: {} passed, {} failed ({} total)",
                file.display(),
                summary.passed,
                summary.failed,
                summary.total()
            );
            Ok(0)
        }
    }
}

/// Merge CLI flags over config defaults into one invocation.
pub fn build_invocation(cfg: &Config, run: RunArgs) -> Invocation {
    let mut inv = Invocation::new(run.binary)
        .args(run.args)
        .envs(run.env);

    if let Some(timeout) = run.timeout.map(Duration::from_secs).or(cfg.timeout()) {
        inv = inv.timeout(timeout);
    }

    if let Some(dir) = run.dir.or_else(|| cfg.exec_dir().cloned()) {
        inv = inv.exec_dir(dir);
    }

    if let Some(dir) = run.manifest_dir.or_else(|| cfg.manifest_dir().cloned()) {
        let mut opts = ManifestOptions::new(dir);
        if let Some(name) = run
            .manifest_name
            .or_else(|| cfg.manifest_name().map(str::to_string))
        {
            opts = opts.name(name);
        }
        opts.annotations = run.annotations;
        opts.hashed_files = run.hashed_files;
        inv = inv.manifest(opts);
    }

    inv
}

async fn run_remote(cfg: &Config, remote: RemoteArgs) -> ExecResult {
    let shell = RemoteShell::new(Arc::new(Executor::new())).with_program(cfg.remote_shell());
    shell
        .exec_cmd(&remote.host, &remote.binary, &remote.args, &remote.env)
        .await
}

/// Echo captured output and turn the result into an exit code.
fn report(res: ExecResult) -> i32 {
    print!("{}", res.stdout);
    eprint!("{}", res.stderr);

    match res.into_result() {
        Ok(_) => 0,
        Err(err) => {
            eprintln!("provexec: {err}");
            exit_code_for(&err)
        }
    }
}

/// Timeouts map to 124, a failing child passes its own code through.
fn exit_code_for(err: &ExecError) -> i32 {
    if err.is_timeout() {
        return EXIT_TIMEOUT;
    }
    err.exit_status().and_then(|status| status.code()).unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::CliArgs;
    use clap::Parser;
    use std::path::PathBuf;

    fn run_args(argv: &[&str]) -> RunArgs {
        let mut full = vec!["provexec", "run"];
        full.extend_from_slice(argv);
        match CliArgs::try_parse_from(full).unwrap().command {
            CliCommand::Run(run) => run,
            other => panic!("expected run, got {other:?}"),
        }
    }

    #[test]
    fn cli_flags_override_config() {
        let cfg = Config::default();
        let inv = build_invocation(
            &cfg,
            run_args(&[
                "--timeout",
                "5",
                "--manifest-dir",
                "/tmp/prov",
                "--manifest-name",
                "bw",
                "--annotate",
                "nodes: 2",
                "--",
                "/bin/echo",
                "hi",
            ]),
        );

        assert_eq!(inv.binary, PathBuf::from("/bin/echo"));
        assert_eq!(inv.args, vec!["hi"]);
        assert_eq!(inv.effective_timeout(), Duration::from_secs(5));
        let manifest = inv.manifest.unwrap();
        assert_eq!(manifest.path(), PathBuf::from("/tmp/prov/bw.MANIFEST"));
        assert_eq!(manifest.annotations, vec!["nodes: 2"]);
    }

    #[test]
    fn no_manifest_dir_means_no_manifest() {
        let inv = build_invocation(&Config::default(), run_args(&["/bin/true"]));
        assert!(inv.manifest.is_none());
        assert_eq!(inv.timeout, None);
    }

    #[test]
    fn timeout_maps_to_its_own_exit_code() {
        let timeout = ExecError::Timeout {
            binary: PathBuf::from("sleep"),
            after: Duration::from_secs(1),
        };
        assert_eq!(exit_code_for(&timeout), EXIT_TIMEOUT);
        assert_eq!(exit_code_for(&ExecError::Config("x".into())), 1);
    }

    #[test]
    fn failing_child_code_is_passed_through() {
        use std::os::unix::process::ExitStatusExt;

        let err = ExecError::Exit {
            binary: PathBuf::from("/bin/false"),
            status: std::process::ExitStatus::from_raw(3 << 8),
        };
        assert_eq!(exit_code_for(&err), 3);
    }
}
