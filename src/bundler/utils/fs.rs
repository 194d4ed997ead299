//! File system utilities for the resource pipeline.
//!
//! Provides idempotent directory operations and an overwriting recursive copy
//! that preserves symlinks.

use crate::bundler::error::{Error, ErrorExt, Result};
use std::{
    io::{self},
    path::Path,
};
use tokio::fs;
use walkdir::WalkDir;

/// Creates all of the directories of the specified path, erasing it first if specified.
pub async fn create_dir_all(path: &Path, erase: bool) -> Result<()> {
    if erase {
        remove_dir_all(path).await?;
    }

    // create_dir_all is already idempotent - succeeds even if dir exists
    fs::create_dir_all(path)
        .await
        .fs_context("creating directory", path)
}

/// Removes the directory and its contents if it exists.
pub async fn remove_dir_all(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()), // Idempotent
        Err(e) => Err(e).fs_context("removing directory", path),
    }
}

/// Makes a symbolic link to a directory.
#[cfg(unix)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a directory.
#[cfg(windows)]
fn symlink_dir(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(unix)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

/// Makes a symbolic link to a file.
#[cfg(windows)]
fn symlink_file(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_file(src, dst)
}

/// Recursively copies the contents of `from` into `to`, replacing any
/// same-named entries already present.
///
/// Entries are visited in file-name order so repeated runs touch files in the
/// same sequence. Symlinks are recreated, not followed.
///
/// Returns the number of regular files copied.
pub async fn copy_dir_contents(from: &Path, to: &Path) -> Result<usize> {
    if !from.is_dir() {
        return Err(Error::GenericError(format!(
            "{from:?} is not a directory"
        )));
    }

    let from = from.to_path_buf();
    let to = to.to_path_buf();

    tokio::task::spawn_blocking(move || copy_dir_contents_blocking(&from, &to)).await?
}

/// Blocking body of [`copy_dir_contents`], for callers already off the async runtime.
pub(crate) fn copy_dir_contents_blocking(from: &Path, to: &Path) -> Result<usize> {
    std::fs::create_dir_all(to).fs_context("creating copy destination", to)?;

    let mut copied = 0;
    for entry in WalkDir::new(from)
        .follow_links(false)
        .min_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        let rel_path = entry.path().strip_prefix(from)?;
        let dest_path = to.join(rel_path);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            if dest_path
                .symlink_metadata()
                .is_ok_and(|m| !m.file_type().is_dir())
            {
                std::fs::remove_file(&dest_path)
                    .fs_context("replacing file with directory", &dest_path)?;
            }
            std::fs::create_dir_all(&dest_path).fs_context("creating directory", &dest_path)?;
            continue;
        }

        clear_destination(&dest_path)?;

        if file_type.is_symlink() {
            let target = std::fs::read_link(entry.path())
                .fs_context("reading symlink", entry.path())?;
            let linked = if entry.path().is_dir() {
                symlink_dir(&target, &dest_path)
            } else {
                symlink_file(&target, &dest_path)
            };
            linked.fs_context("creating symlink", &dest_path)?;
        } else {
            std::fs::copy(entry.path(), &dest_path).fs_context("copying file", &dest_path)?;
            copied += 1;
        }
    }

    Ok(copied)
}

/// Removes whatever occupies `path` so a file or symlink can be written there.
fn clear_destination(path: &Path) -> Result<()> {
    match std::fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_dir() => {
            std::fs::remove_dir_all(path).fs_context("replacing directory with file", path)
        }
        Ok(_) => std::fs::remove_file(path).fs_context("replacing file", path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).fs_context("inspecting destination", path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn copy_overwrites_existing_files() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("from");
        let to = temp.path().join("to");
        std::fs::create_dir_all(from.join("nested")).unwrap();
        std::fs::write(from.join("a.txt"), b"new").unwrap();
        std::fs::write(from.join("nested/b.txt"), b"nested").unwrap();
        std::fs::create_dir_all(&to).unwrap();
        std::fs::write(to.join("a.txt"), b"old").unwrap();
        std::fs::write(to.join("keep.txt"), b"untouched").unwrap();

        let copied = copy_dir_contents(&from, &to).await.unwrap();

        assert_eq!(copied, 2);
        assert_eq!(std::fs::read(to.join("a.txt")).unwrap(), b"new");
        assert_eq!(std::fs::read(to.join("nested/b.txt")).unwrap(), b"nested");
        assert_eq!(std::fs::read(to.join("keep.txt")).unwrap(), b"untouched");
    }

    #[tokio::test]
    async fn copy_replaces_directory_with_file() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("from");
        let to = temp.path().join("to");
        std::fs::create_dir_all(&from).unwrap();
        std::fs::write(from.join("entry"), b"file").unwrap();
        std::fs::create_dir_all(to.join("entry/inner")).unwrap();

        copy_dir_contents(&from, &to).await.unwrap();

        assert!(to.join("entry").is_file());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn copy_recreates_symlinks() {
        let temp = TempDir::new().unwrap();
        let from = temp.path().join("from");
        let to = temp.path().join("to");
        std::fs::create_dir_all(&from).unwrap();
        std::fs::write(from.join("target.txt"), b"t").unwrap();
        std::os::unix::fs::symlink("target.txt", from.join("link.txt")).unwrap();

        copy_dir_contents(&from, &to).await.unwrap();
        copy_dir_contents(&from, &to).await.unwrap();

        let link = std::fs::read_link(to.join("link.txt")).unwrap();
        assert_eq!(link, Path::new("target.txt"));
    }

    #[tokio::test]
    async fn copy_from_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let result = copy_dir_contents(&temp.path().join("missing"), temp.path()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn remove_dir_all_is_idempotent() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("gone");
        remove_dir_all(&dir).await.unwrap();
        create_dir_all(&dir, false).await.unwrap();
        std::fs::write(dir.join("f"), b"x").unwrap();
        create_dir_all(&dir, true).await.unwrap();
        assert!(dir.exists());
        assert!(!dir.join("f").exists());
    }
}
