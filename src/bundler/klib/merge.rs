//! Resource merge walker.
//!
//! Copies the `resources/` payload of every upstream compiled library into a
//! link output. Upstream libraries are only read. Libraries are processed in
//! input order and later ones overwrite same-named files from earlier ones.

use super::RESOURCES_DIR_NAME;
use crate::bundler::{
    archive::Archive,
    error::{ErrorExt, Result},
    utils::fs::copy_dir_contents_blocking,
};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    sync::Arc,
};

/// Summary of one merge run.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MergeReport {
    /// Libraries inspected (matching extension, first occurrence only).
    pub scanned: usize,
    /// Libraries that carried a `resources/` directory.
    pub with_resources: usize,
    /// Inputs ignored because of their extension or because they repeat an earlier path.
    pub skipped: usize,
    /// Regular files written into the output.
    pub files_copied: usize,
}

/// Copies resource payloads from upstream libraries into link outputs.
#[derive(Clone, Debug)]
pub struct ResourceMergeWalker {
    archive: Arc<dyn Archive>,
    library_extension: String,
}

impl ResourceMergeWalker {
    /// Creates a walker that considers files with `library_extension` (without dot).
    pub fn new(archive: Arc<dyn Archive>, library_extension: impl Into<String>) -> Self {
        Self {
            archive,
            library_extension: library_extension.into(),
        }
    }

    fn is_library(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(self.library_extension.as_str()))
    }

    /// Merges the resources of every library in `upstream` into `output_dir`.
    ///
    /// An empty `upstream` leaves `output_dir` untouched. Libraries without
    /// resources are skipped silently.
    ///
    /// # Errors
    ///
    /// Fails if an upstream library cannot be read or extracted, or
    /// `output_dir` cannot be written.
    pub async fn merge_into(
        &self,
        output_dir: &Path,
        upstream: &[PathBuf],
    ) -> Result<MergeReport> {
        let mut report = MergeReport::default();
        let mut seen = HashSet::new();

        for library in upstream {
            if !self.is_library(library) {
                log::debug!("Skipping non-library input {}", library.display());
                report.skipped += 1;
                continue;
            }
            if !seen.insert(library.clone()) {
                log::debug!("Skipping repeated library {}", library.display());
                report.skipped += 1;
                continue;
            }

            report.scanned += 1;
            log::info!(
                "copy resources from {} into {}",
                library.display(),
                output_dir.display()
            );

            let archive = Arc::clone(&self.archive);
            let library = library.clone();
            let output_dir = output_dir.to_path_buf();
            let copied = tokio::task::spawn_blocking(move || {
                copy_library_resources(archive.as_ref(), &library, &output_dir)
            })
            .await??;

            if let Some(count) = copied {
                report.with_resources += 1;
                report.files_copied += count;
            }
        }

        log::debug!(
            "Merged {} of {} libraries ({} file(s)) into {}",
            report.with_resources,
            report.scanned,
            report.files_copied,
            output_dir.display()
        );
        Ok(report)
    }
}

/// Copies one library's `resources/` into `output_dir`.
///
/// Returns `None` when the library carries no resources. Unpacked library
/// directories are read in place; archives are extracted to a scratch
/// directory first.
fn copy_library_resources(
    archive: &dyn Archive,
    library: &Path,
    output_dir: &Path,
) -> Result<Option<usize>> {
    let metadata = std::fs::metadata(library).fs_context("reading upstream library", library)?;

    if metadata.is_dir() {
        return copy_resources_dir(&library.join(RESOURCES_DIR_NAME), output_dir);
    }

    let stem = library
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "library".to_string());
    let scratch = tempfile::Builder::new()
        .prefix(&format!("{stem}-merge-"))
        .tempdir()
        .fs_context("creating merge directory", std::env::temp_dir())?;

    archive.extract(library, scratch.path())?;
    copy_resources_dir(&scratch.path().join(RESOURCES_DIR_NAME), output_dir)
}

fn copy_resources_dir(resources: &Path, output_dir: &Path) -> Result<Option<usize>> {
    if !resources.is_dir() {
        log::debug!("No resources at {}", resources.display());
        return Ok(None);
    }
    copy_dir_contents_blocking(resources, output_dir).map(Some)
}
