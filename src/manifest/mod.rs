// src/manifest/mod.rs

//! Provenance manifests.
//!
//! A manifest is a small text file written after a successful execution:
//!
//! ```text
//! Command: /usr/bin/env FOO=1
//! Execution path: /tmp/work
//! Execution time: 2024-05-01 13:37:00
//! <caller annotations, verbatim>
//! /usr/bin/env: <blake3>
//! <one line per extra hashed file>
//! ```
//!
//! It lives at `<dir>/<name>.MANIFEST` and is written at most once: an
//! existing manifest is authoritative and never overwritten.
//!
//! - [`hash`] produces the per-file hash lines.
//! - [`writer`] creates the file on disk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

pub mod hash;
pub mod writer;

pub use hash::{compute_file_hash, hash_files};
pub use writer::{FsManifestWriter, ManifestWriter};

/// Used when no manifest name is given.
pub const DEFAULT_MANIFEST_NAME: &str = "exec";

/// Fixed suffix appended to every manifest name.
pub const MANIFEST_SUFFIX: &str = ".MANIFEST";

/// Format of the `Execution time:` line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where and what to record once a command succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestOptions {
    /// Directory holding the manifest; created if missing.
    pub dir: PathBuf,
    /// Manifest name without suffix. `None` means [`DEFAULT_MANIFEST_NAME`].
    pub name: Option<String>,
    /// Extra lines copied verbatim after the header.
    pub annotations: Vec<String>,
    /// Files hashed after the binary, in this order.
    pub hashed_files: Vec<PathBuf>,
}

impl ManifestOptions {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            ..Self::default()
        }
    }

    /// Set the manifest name. An empty name resets it to the default.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.name = if name.is_empty() { None } else { Some(name) };
        self
    }

    pub fn annotate(mut self, line: impl Into<String>) -> Self {
        self.annotations.push(line.into());
        self
    }

    pub fn hash_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.hashed_files.push(path.into());
        self
    }

    pub fn effective_name(&self) -> &str {
        self.name.as_deref().unwrap_or(DEFAULT_MANIFEST_NAME)
    }

    /// `<dir>/<name>.MANIFEST`
    pub fn path(&self) -> PathBuf {
        self.dir
            .join(format!("{}{}", self.effective_name(), MANIFEST_SUFFIX))
    }
}

/// Path to hash for the executed binary.
///
/// A binary given as `./tool` is relative to the execution directory, not to
/// wherever the caller happens to be, so it is joined onto `exec_dir`. Any
/// other path is returned unchanged.
pub fn binary_hash_path(binary: &Path, exec_dir: &Path) -> PathBuf {
    match binary.to_str().and_then(|s| s.strip_prefix("./")) {
        Some(rest) => exec_dir.join(rest),
        None => binary.to_path_buf(),
    }
}

/// `<bin> <args...>` as written on the `Command:` line.
pub fn command_line(binary: &Path, args: &[String]) -> String {
    let mut line = binary.display().to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}

/// Header and annotation lines of a manifest, without hashes.
pub fn record_lines(
    binary: &Path,
    args: &[String],
    exec_dir: &Path,
    executed_at: &DateTime<Local>,
    annotations: &[String],
) -> Vec<String> {
    let mut lines = Vec::with_capacity(3 + annotations.len());
    lines.push(format!("Command: {}", command_line(binary, args)));
    lines.push(format!("Execution path: {}", exec_dir.display()));
    lines.push(format!(
        "Execution time: {}",
        executed_at.format(TIMESTAMP_FORMAT)
    ));
    lines.extend(annotations.iter().cloned());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn default_name_is_exec() {
        let opts = ManifestOptions::new("/tmp/m");
        assert_eq!(opts.path(), PathBuf::from("/tmp/m/exec.MANIFEST"));

        let named = ManifestOptions::new("/tmp/m").name("build");
        assert_eq!(named.path(), PathBuf::from("/tmp/m/build.MANIFEST"));

        let empty = ManifestOptions::new("/tmp/m").name("");
        assert_eq!(empty.path(), PathBuf::from("/tmp/m/exec.MANIFEST"));
    }

    #[test]
    fn dot_slash_binary_is_joined_to_exec_dir() {
        let dir = Path::new("/work/run1");
        assert_eq!(
            binary_hash_path(Path::new("./bench"), dir),
            PathBuf::from("/work/run1/bench")
        );
        assert_eq!(
            binary_hash_path(Path::new("/usr/bin/env"), dir),
            PathBuf::from("/usr/bin/env")
        );
        assert_eq!(
            binary_hash_path(Path::new("../bench"), dir),
            PathBuf::from("../bench")
        );
    }

    #[test]
    fn record_lines_follow_fixed_order() {
        let at = Local.with_ymd_and_hms(2023, 4, 5, 6, 7, 8).unwrap();
        let lines = record_lines(
            Path::new("/usr/bin/osu_bw"),
            &["-m".to_string(), "1024".to_string()],
            Path::new("/scratch"),
            &at,
            &["MPI: openmpi-4.1".to_string(), "nodes: 2".to_string()],
        );

        assert_eq!(
            lines,
            vec![
                "Command: /usr/bin/osu_bw -m 1024",
                "Execution path: /scratch",
                "Execution time: 2023-04-05 06:07:08",
                "MPI: openmpi-4.1",
                "nodes: 2",
            ]
        );
    }

    #[test]
    fn command_line_without_args_has_no_trailing_space() {
        assert_eq!(command_line(Path::new("/bin/true"), &[]), "/bin/true");
    }
}
