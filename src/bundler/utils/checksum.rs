//! Content checksums for bundles and merged outputs.
//!
//! Digests cover relative paths and file bytes only, so two trees with the
//! same content hash equal regardless of timestamps.

use crate::bundler::{Result, error::ErrorExt};
use sha2::{Digest, Sha256};
use std::{io::Read, path::Path};

/// Calculates the SHA-256 content digest of a directory tree.
///
/// # Algorithm
///
/// 1. Collect regular files and symlinks with walkdir (links not followed)
/// 2. Sort relative paths for a deterministic order
/// 3. For each entry: hash(relative_path, NUL, content or link target, NUL)
///
/// # Returns
///
/// Hex-encoded SHA-256 hash (64 characters).
pub async fn directory_sha256(dir: &Path) -> Result<String> {
    let dir = dir.to_path_buf();
    tokio::task::spawn_blocking(move || directory_sha256_blocking(&dir)).await?
}

pub(crate) fn directory_sha256_blocking(dir: &Path) -> Result<String> {
    let mut entries = Vec::new();
    for entry in walkdir::WalkDir::new(dir).follow_links(false) {
        let entry = entry?;
        if !entry.file_type().is_dir() {
            entries.push(entry);
        }
    }
    entries.sort_by(|a, b| a.path().cmp(b.path()));

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    for entry in entries {
        let rel_path = entry.path().strip_prefix(dir)?;
        hasher.update(rel_path.to_string_lossy().replace('\\', "/").as_bytes());
        hasher.update([0u8]);

        if entry.file_type().is_symlink() {
            let target = std::fs::read_link(entry.path())
                .fs_context("reading symlink for hashing", entry.path())?;
            hasher.update(target.to_string_lossy().as_bytes());
        } else {
            let mut file = std::fs::File::open(entry.path())
                .fs_context("opening file for hashing", entry.path())?;
            loop {
                let n = file
                    .read(&mut buffer)
                    .fs_context("reading file for hash calculation", entry.path())?;
                if n == 0 {
                    break;
                }
                hasher.update(&buffer[..n]);
            }
        }
        hasher.update([0u8]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
