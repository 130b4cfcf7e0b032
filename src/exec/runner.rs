// src/exec/runner.rs

//! The bounded executor: one command, one deadline, one result.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use tokio::process::Command;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::ExecError;
use crate::exec::invocation::{split_env_entry, Invocation};
use crate::exec::output::OutputCapture;
use crate::exec::result::ExecResult;
use crate::fs::{CreateOutcome, FileSystem, RealFileSystem};
use crate::manifest::{
    self, binary_hash_path, command_line, FsManifestWriter, ManifestOptions, ManifestWriter,
};
use crate::observer::{Recorder, TracingRecorder};

/// How long output readers may keep draining after the child is gone.
const DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Deadline cap for timeouts too large to add to the current instant.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// What happened to the manifest of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestOutcome {
    Written(PathBuf),
    /// A manifest was already there and was left untouched.
    AlreadyExists(PathBuf),
    /// Directory creation or writing failed; the run itself is unaffected.
    Failed,
}

/// Runs commands under a deadline and writes their manifests.
///
/// Collaborators are injectable so tests can swap the filesystem, the
/// manifest writer and the diagnostic recorder:
///
/// ```no_run
/// # async fn demo() {
/// use provexec::exec::{Executor, Invocation};
///
/// let res = Executor::new().run(&Invocation::new("/usr/bin/date")).await;
/// assert!(res.is_success());
/// # }
/// ```
#[derive(Clone)]
pub struct Executor {
    fs: Arc<dyn FileSystem>,
    writer: Arc<dyn ManifestWriter>,
    recorder: Arc<dyn Recorder>,
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}

impl Executor {
    pub fn new() -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        Self {
            writer: Arc::new(FsManifestWriter::new(Arc::clone(&fs))),
            fs,
            recorder: Arc::new(TracingRecorder),
        }
    }

    /// Use `fs` for manifest directories, hashing and (unless a writer is
    /// set afterwards) manifest writing.
    pub fn with_filesystem(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.writer = Arc::new(FsManifestWriter::new(Arc::clone(&fs)));
        self.fs = fs;
        self
    }

    pub fn with_writer(mut self, writer: Arc<dyn ManifestWriter>) -> Self {
        self.writer = writer;
        self
    }

    pub fn with_recorder(mut self, recorder: Arc<dyn Recorder>) -> Self {
        self.recorder = recorder;
        self
    }

    /// Run `inv` to completion or until its deadline fires.
    ///
    /// The child is killed if the deadline fires first, and also if this
    /// future is dropped before it completes. Manifest problems are reported
    /// to the recorder only and never turn a success into a failure.
    pub async fn run(&self, inv: &Invocation) -> ExecResult {
        let timeout = inv.effective_timeout();
        let exec_dir = inv.effective_exec_dir();
        let binary = inv.binary.clone();

        self.recorder.record(&format!(
            "-> Running {} from {}",
            command_line(&binary, &inv.args),
            exec_dir.display()
        ));

        let mut cmd = Command::new(&binary);
        cmd.args(&inv.args)
            .current_dir(&exec_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        for entry in &inv.env {
            match split_env_entry(entry) {
                Some((key, value)) => {
                    cmd.env(key, value);
                }
                None => self
                    .recorder
                    .record(&format!("ignoring malformed environment entry {entry:?}")),
            }
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(source) => {
                warn!(binary = %binary.display(), error = %source, "failed to start process");
                return ExecResult::failed(ExecError::Launch { binary, source });
            }
        };

        // The deadline is armed from here on.
        let deadline = deadline_after(Instant::now(), timeout);
        info!(
            binary = %binary.display(),
            pid = child.id(),
            timeout_ms = timeout.as_millis() as u64,
            "process started"
        );

        let stdout = OutputCapture::spawn("stdout", child.stdout.take());
        let stderr = OutputCapture::spawn("stderr", child.stderr.take());

        let waited = tokio::time::timeout_at(deadline, child.wait()).await;
        let error = match waited {
            Ok(Ok(status)) if status.success() => {
                debug!(binary = %binary.display(), "process exited successfully");
                None
            }
            Ok(Ok(status)) => {
                info!(binary = %binary.display(), %status, "process exited with failure");
                Some(ExecError::Exit {
                    binary: binary.clone(),
                    status,
                })
            }
            Ok(Err(source)) => Some(ExecError::Wait {
                binary: binary.clone(),
                source,
            }),
            Err(_elapsed) => {
                warn!(
                    binary = %binary.display(),
                    timeout_ms = timeout.as_millis() as u64,
                    "deadline exceeded; killing process"
                );
                if let Err(e) = child.kill().await {
                    warn!(binary = %binary.display(), error = %e, "failed to kill timed out process");
                }
                Some(ExecError::Timeout {
                    binary: binary.clone(),
                    after: timeout,
                })
            }
        };

        let drain = match error {
            Some(ref e) if e.is_timeout() => DRAIN_GRACE,
            _ => deadline
                .saturating_duration_since(Instant::now())
                .max(DRAIN_GRACE),
        };
        let stdout = stdout.finish(drain).await;
        let stderr = stderr.finish(drain).await;

        if let Some(error) = error {
            return ExecResult {
                error: Some(error),
                stdout,
                stderr,
            };
        }

        if let Some(opts) = &inv.manifest {
            self.produce_manifest(inv, opts, exec_dir).await;
        }

        ExecResult::success(stdout, stderr)
    }

    /// Hashing and writing happen on the blocking pool.
    async fn produce_manifest(
        &self,
        inv: &Invocation,
        opts: &ManifestOptions,
        exec_dir: PathBuf,
    ) -> ManifestOutcome {
        let job = ManifestJob {
            fs: Arc::clone(&self.fs),
            writer: Arc::clone(&self.writer),
            recorder: Arc::clone(&self.recorder),
            binary: inv.binary.clone(),
            args: inv.args.clone(),
            exec_dir,
            opts: opts.clone(),
        };

        match tokio::task::spawn_blocking(move || job.write()).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.recorder
                    .record(&format!("failed to create manifest: {e}"));
                ManifestOutcome::Failed
            }
        }
    }
}

/// `now + timeout`, with the timeout capped at [`FAR_FUTURE`].
fn deadline_after(now: Instant, timeout: Duration) -> Instant {
    now + timeout.min(FAR_FUTURE)
}

struct ManifestJob {
    fs: Arc<dyn FileSystem>,
    writer: Arc<dyn ManifestWriter>,
    recorder: Arc<dyn Recorder>,
    binary: PathBuf,
    args: Vec<String>,
    exec_dir: PathBuf,
    opts: ManifestOptions,
}

impl ManifestJob {
    fn write(self) -> ManifestOutcome {
        let dir = &self.opts.dir;
        if !self.fs.is_dir(dir) {
            if let Err(e) = self.fs.create_dir_all(dir) {
                self.recorder.record(&format!(
                    "failed to create destination directory for the manifest: {e:#}"
                ));
                return ManifestOutcome::Failed;
            }
        }

        let path = self.opts.path();
        if self.fs.exists(&path) {
            return self.already_exists(path);
        }

        let mut lines = manifest::record_lines(
            &self.binary,
            &self.args,
            &self.exec_dir,
            &Local::now(),
            &self.opts.annotations,
        );
        lines.extend(manifest::hash_files(self.fs.as_ref(), &self.files_to_hash()));

        match self.writer.create(&path, &lines) {
            Ok(CreateOutcome::Created) => {
                self.recorder.record(&format!(
                    "-> Manifest successfully created ({})",
                    path.display()
                ));
                ManifestOutcome::Written(path)
            }
            Ok(CreateOutcome::AlreadyExists) => self.already_exists(path),
            Err(e) => {
                self.recorder
                    .record(&format!("failed to create manifest: {e:#}"));
                ManifestOutcome::Failed
            }
        }
    }

    /// The binary first, then the caller's files.
    fn files_to_hash(&self) -> Vec<PathBuf> {
        let mut files = Vec::with_capacity(1 + self.opts.hashed_files.len());
        files.push(binary_hash_path(&self.binary, &self.exec_dir));
        files.extend(self.opts.hashed_files.iter().cloned());
        files
    }

    fn already_exists(&self, path: PathBuf) -> ManifestOutcome {
        self.recorder.record(&format!(
            "Manifest {} already exists, skipping...",
            path.display()
        ));
        ManifestOutcome::AlreadyExists(path)
    }
}

/// Write the manifest for an already-successful invocation.
///
/// Exposed for callers that ran the command some other way but still want the
/// same provenance record.
pub async fn write_manifest(executor: &Executor, inv: &Invocation) -> Option<ManifestOutcome> {
    let opts = inv.manifest.as_ref()?;
    Some(
        executor
            .produce_manifest(inv, opts, inv.effective_exec_dir())
            .await,
    )
}
