// src/manifest/writer.rs

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::fs::{CreateOutcome, FileSystem};

/// Persists the lines of a manifest.
pub trait ManifestWriter: Send + Sync {
    /// Create the manifest at `path` holding `lines`.
    ///
    /// Must not touch an existing file; report it as
    /// [`CreateOutcome::AlreadyExists`] instead.
    fn create(&self, path: &Path, lines: &[String]) -> Result<CreateOutcome>;
}

/// Writes manifests through a [`FileSystem`], one line per entry.
#[derive(Debug, Clone)]
pub struct FsManifestWriter {
    fs: Arc<dyn FileSystem>,
}

impl FsManifestWriter {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl ManifestWriter for FsManifestWriter {
    fn create(&self, path: &Path, lines: &[String]) -> Result<CreateOutcome> {
        let mut contents = lines.join("\n");
        contents.push('\n');
        self.fs.create_new(path, contents.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn writes_lines_with_trailing_newline() {
        let fs = MockFileSystem::new();
        fs.add_dir("/m");
        let writer = FsManifestWriter::new(Arc::new(fs.clone()));

        let outcome = writer
            .create(
                Path::new("/m/exec.MANIFEST"),
                &["Command: /bin/true".to_string(), "note".to_string()],
            )
            .unwrap();

        assert_eq!(outcome, CreateOutcome::Created);
        assert_eq!(
            fs.contents("/m/exec.MANIFEST").unwrap(),
            b"Command: /bin/true\nnote\n".to_vec()
        );
    }

    #[test]
    fn existing_manifest_is_left_alone() {
        let fs = MockFileSystem::new();
        fs.add_file("/m/exec.MANIFEST", b"original\n");
        let writer = FsManifestWriter::new(Arc::new(fs.clone()));

        let outcome = writer
            .create(Path::new("/m/exec.MANIFEST"), &["new".to_string()])
            .unwrap();

        assert_eq!(outcome, CreateOutcome::AlreadyExists);
        assert_eq!(fs.contents("/m/exec.MANIFEST").unwrap(), b"original\n".to_vec());
    }
}
