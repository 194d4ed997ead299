//! Advisory file locks for state files shared between concurrent processes.

use crate::bundler::error::{ErrorExt, Result};
use std::{
    fs::{File, OpenOptions},
    path::{Path, PathBuf},
};

/// An exclusive advisory lock, released on drop.
///
/// The lock file itself is left in place; removing it would let a waiter
/// lock an unlinked inode.
#[derive(Debug)]
pub struct FileLock {
    #[cfg(unix)]
    _lock: nix::fcntl::Flock<File>,
    #[cfg(not(unix))]
    _file: File,
    path: PathBuf,
}

impl FileLock {
    /// Blocks until an exclusive lock on `path` is held, creating the file if needed.
    pub async fn acquire(path: &Path) -> Result<Self> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::acquire_blocking(&path)).await?
    }

    fn acquire_blocking(path: &Path) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)
            .fs_context("opening lock file", path)?;

        #[cfg(unix)]
        let lock = nix::fcntl::Flock::lock(file, nix::fcntl::FlockArg::LockExclusive)
            .map_err(|(_, errno)| std::io::Error::from(errno))
            .fs_context("locking", path)?;

        #[cfg(not(unix))]
        file.lock().fs_context("locking", path)?;

        log::debug!("Locked {}", path.display());
        Ok(Self {
            #[cfg(unix)]
            _lock: lock,
            #[cfg(not(unix))]
            _file: file,
            path: path.to_path_buf(),
        })
    }

    /// Path of the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
