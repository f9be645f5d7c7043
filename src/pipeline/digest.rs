// src/pipeline/digest.rs

use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use blake3::Hasher;
use tracing::debug;

use crate::errors::Result;

/// Compute a deterministic digest over a snapshot directory.
///
/// Relative paths and file contents both feed the hash, and paths are
/// sorted first so the digest is independent of directory iteration
/// order. Two snapshots hash equal iff they contain the same files with
/// the same bytes.
pub fn compute_dir_digest(root: &Path) -> Result<String> {
    let mut files = Vec::new();
    collect_files(root, &mut files)?;
    files.sort();

    let mut hasher = Hasher::new();
    for path in &files {
        let rel = path.strip_prefix(root).unwrap_or(path);
        debug!("hashing file {:?}", rel);
        hasher.update(rel.to_string_lossy().as_bytes());
        hasher.update(&[0]);

        let mut file = File::open(path)?;
        let mut buf = [0u8; 8192];
        loop {
            let n = file.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
    }

    Ok(hasher.finalize().to_hex().to_string())
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else if path.is_file() {
            out.push(path);
        }
    }
    Ok(())
}
