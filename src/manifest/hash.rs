// src/manifest/hash.rs

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::debug;

use crate::fs::FileSystem;

/// Compute the blake3 hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let mut hasher = Hasher::new();
    let mut file = fs
        .open_read(path)
        .with_context(|| format!("opening file for hashing: {:?}", path))?;
    let mut buf = [0u8; 8192];
    loop {
        let n = file
            .read(&mut buf)
            .with_context(|| format!("reading file for hashing: {:?}", path))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// One manifest line per path, in the given order.
///
/// Unlike the watcher-style aggregate hash, order matters here: the binary
/// comes first, then the caller's files. A file that cannot be read still
/// gets a line so the manifest shows it was asked for.
pub fn hash_files(fs: &dyn FileSystem, paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|path| match compute_file_hash(fs, path) {
            Ok(hash) => {
                debug!(path = %path.display(), hash = %hash, "hashed file for manifest");
                format!("{}: {}", path.display(), hash)
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "unable to hash file");
                format!("{}: unavailable ({err})", path.display())
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn hashes_known_content() {
        let fs = MockFileSystem::new();
        fs.add_file("/data/test.txt", b"hello world");

        let hash = compute_file_hash(&fs, Path::new("/data/test.txt")).unwrap();
        // blake3 hash of "hello world"
        assert_eq!(
            hash,
            "d74981efa70a0c880b8d8c1985d075dbcbf679b99a5f9914e5aaf96b831a9e24"
        );
    }

    #[test]
    fn hash_lines_keep_order_and_report_missing_files() {
        let fs = MockFileSystem::new();
        fs.add_file("/bin/tool", b"binary");
        fs.add_file("/etc/tool.conf", b"conf");

        let lines = hash_files(
            &fs,
            &[
                PathBuf::from("/bin/tool"),
                PathBuf::from("/missing/input"),
                PathBuf::from("/etc/tool.conf"),
            ],
        );

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("/bin/tool: "));
        assert!(lines[1].starts_with("/missing/input: unavailable ("), "{}", lines[1]);
        assert!(lines[2].starts_with("/etc/tool.conf: "));
        assert_ne!(lines[0], lines[2]);
    }
}
