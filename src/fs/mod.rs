// src/fs/mod.rs

//! Filesystem collaborators used by manifest generation.
//!
//! The executor only needs a handful of operations: existence checks,
//! recursive directory creation, reading a file for hashing and creating a
//! file exclusively. Keeping them behind a trait lets tests swap in
//! [`mock::MockFileSystem`] to simulate unwritable directories.

use std::fmt::Debug;
use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

pub mod mock;

/// Outcome of an exclusive create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// Something already lives at the path; nothing was written.
    AlreadyExists,
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn read_to_string(&self, path: &Path) -> Result<String>;
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>>;
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Create `path` and write `contents`, failing over to
    /// [`CreateOutcome::AlreadyExists`] if the file is already there.
    ///
    /// The check and the create are a single step, so two writers racing on
    /// the same path cannot both succeed.
    fn create_new(&self, path: &Path, contents: &[u8]) -> Result<CreateOutcome>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).with_context(|| format!("reading file {:?}", path))
    }

    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path).with_context(|| format!("opening file {:?}", path))?;
        Ok(Box::new(file))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        fs::create_dir_all(path).with_context(|| format!("creating dir {:?}", path))
    }

    fn create_new(&self, path: &Path, contents: &[u8]) -> Result<CreateOutcome> {
        let mut file = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Ok(CreateOutcome::AlreadyExists);
            }
            Err(e) => {
                return Err(e).with_context(|| format!("creating file {:?}", path));
            }
        };
        fill_new_file(path, &mut file, contents)?;
        Ok(CreateOutcome::Created)
    }
}

/// Write `contents` to the just-created `path`. A partial file is removed so
/// a later create can still succeed.
fn fill_new_file(path: &Path, out: &mut impl Write, contents: &[u8]) -> Result<()> {
    let Err(e) = out.write_all(contents).and_then(|()| out.flush()) else {
        return Ok(());
    };
    if let Err(remove_err) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %remove_err, "failed to remove partial file");
    }
    Err(e).with_context(|| format!("writing to file {:?}", path))
}
