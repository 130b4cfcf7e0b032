// tests/executor_behaviour.rs

mod common;
use crate::common::{
    init_tracing, lookup, print_then_sleep, shell, shell_with_timeout, with_timeout,
};

use std::sync::Arc;
use std::time::{Duration, Instant};

use provexec::errors::ExecError;
use provexec::exec::{Executor, Invocation};
use provexec::observer::MemoryRecorder;

#[tokio::test]
async fn env_overlay_reaches_the_child() {
    init_tracing();
    let Some(env_bin) = lookup("env") else {
        eprintln!("'env' command not available, skipping...");
        return;
    };

    let res = Executor::new()
        .run(&Invocation::new(env_bin).env("TOTO=titi"))
        .await;

    assert!(
        res.is_success(),
        "execution failed: {:?}, stdout: {}, stderr: {}",
        res.error,
        res.stdout,
        res.stderr
    );
    assert!(res.stdout.contains("TOTO=titi"), "{}", res.stdout);
}

#[tokio::test]
async fn overlay_keeps_the_parent_environment() {
    init_tracing();
    let res = Executor::new()
        .run(&shell("echo \"$PATH\"").env("TOTO=titi"))
        .await;

    assert!(res.is_success(), "{:?}", res.error);
    assert!(!res.stdout.trim().is_empty(), "PATH should be inherited");
}

#[tokio::test]
async fn last_duplicate_env_entry_wins() {
    init_tracing();
    let res = Executor::new()
        .run(&shell("echo $DUP").env("DUP=first").env("DUP=second"))
        .await;

    assert!(res.is_success(), "{:?}", res.error);
    assert_eq!(res.stdout, "second\n");
}

#[tokio::test]
async fn timeout_kills_the_command_and_is_distinguishable() {
    init_tracing();
    let Some(sleep) = lookup("sleep") else {
        panic!("unable to find sleep");
    };

    let inv = Invocation::new(sleep)
        .arg("10")
        .timeout(Duration::from_secs(1));

    let started = Instant::now();
    let res = Executor::new().run(&inv).await;
    let elapsed = started.elapsed();

    assert!(res.timed_out(), "timeout not detected: {:?}", res.error);
    assert!(elapsed < Duration::from_secs(5), "took {elapsed:?}");
    let err = res.error.as_ref().unwrap();
    assert!(matches!(err, ExecError::Timeout { after, .. } if *after == Duration::from_secs(1)));
    assert!(err.exit_status().is_none());
}

#[tokio::test]
async fn partial_output_survives_a_timeout() {
    init_tracing();
    let inv = print_then_sleep("started-work", 10).timeout(Duration::from_secs(1));

    let res = Executor::new().run(&inv).await;

    assert!(res.timed_out());
    assert!(res.stdout.contains("started-work"), "{:?}", res.stdout);
}

#[tokio::test]
async fn zero_timeout_uses_the_default_deadline() {
    init_tracing();
    let inv = shell("sleep 1; echo done").timeout(Duration::ZERO);
    assert_eq!(inv.effective_timeout(), provexec::exec::DEFAULT_TIMEOUT);

    let res = Executor::new().run(&inv).await;
    assert!(res.is_success(), "{:?}", res.error);
    assert_eq!(res.stdout, "done\n");
}

#[tokio::test]
async fn non_zero_exit_is_a_failure_with_output() {
    init_tracing();
    let res = Executor::new()
        .run(&shell("echo partial; echo oops >&2; exit 3"))
        .await;

    let err = res.error.as_ref().expect("non-zero exit must fail");
    assert!(!err.is_timeout());
    assert_eq!(err.exit_status().and_then(|s| s.code()), Some(3));
    assert!(err.to_string().contains("exit status: 3"), "{err}");
    assert_eq!(res.stdout, "partial\n");
    assert_eq!(res.stderr, "oops\n");
}

#[tokio::test]
async fn missing_binary_is_a_launch_failure() {
    init_tracing();
    let res = Executor::new()
        .run(&Invocation::new("/nonexistent/provexec-test-binary"))
        .await;

    assert!(matches!(res.error, Some(ExecError::Launch { .. })));
    assert!(!res.timed_out());
    assert!(res.stdout.is_empty());
    assert!(res.stderr.is_empty());
}

#[tokio::test]
async fn command_runs_in_exec_dir() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let expected = dir.path().canonicalize().unwrap();

    let res = Executor::new()
        .run(&shell("pwd -P").exec_dir(dir.path()))
        .await;

    assert!(res.is_success(), "{:?}", res.error);
    assert_eq!(res.stdout.trim(), expected.to_string_lossy());
}

#[tokio::test]
async fn malformed_env_entries_are_reported_and_skipped() {
    init_tracing();
    let recorder = MemoryRecorder::new();
    let executor = Executor::new().with_recorder(Arc::new(recorder.clone()));

    let res = executor
        .run(&shell("echo ${GOOD}").env("NOT_AN_ASSIGNMENT").env("GOOD=yes"))
        .await;

    assert!(res.is_success(), "{:?}", res.error);
    assert_eq!(res.stdout, "yes\n");
    assert!(recorder.contains("NOT_AN_ASSIGNMENT"));

    let messages = recorder.messages();
    assert!(messages[0].starts_with("-> Running /bin/sh -c"), "{messages:?}");
}

#[tokio::test]
async fn unbounded_timeouts_still_run() {
    init_tracing();
    let executor = Executor::new();

    for timeout in [Duration::MAX, Duration::from_secs(u64::MAX)] {
        let res = with_timeout(executor.run(&shell("echo done").timeout(timeout))).await;
        assert!(res.is_success(), "{timeout:?}: {:?}", res.error);
        assert_eq!(res.stdout, "done\n");
    }
}

#[tokio::test]
async fn deadlines_do_not_leak_between_runs() {
    init_tracing();
    let executor = Executor::new();

    let first = executor
        .run(&shell_with_timeout("sleep 5", Duration::from_millis(200)))
        .await;
    assert!(first.timed_out());

    let second = executor.run(&shell("sleep 1; echo ok")).await;
    assert!(second.is_success(), "{:?}", second.error);
    assert_eq!(second.stdout, "ok\n");
}
