//! Compiled library archive access.
//!
//! The pipeline only needs two operations on a library archive: unpack it to
//! a directory and pack a directory back into an archive file. [`Archive`]
//! captures that so the repacker and merge walker do not depend on the
//! container format. [`ZipArchiver`] is the implementation for `.klib`
//! libraries, which are zip files.

mod zipfile;

pub use zipfile::ZipArchiver;

use crate::bundler::Result;
use std::{fmt::Debug, path::Path};

/// Round-trip capability over a compiled library container format.
///
/// Both operations block; async callers run them on the blocking pool.
pub trait Archive: Debug + Send + Sync {
    /// Unpacks `archive` into `dest`, creating it if needed.
    fn extract(&self, archive: &Path, dest: &Path) -> Result<()>;

    /// Packs the contents of `dir` into a new archive at `archive`.
    ///
    /// Paths inside the archive are relative to `dir`.
    fn compress(&self, dir: &Path, archive: &Path) -> Result<()>;
}
