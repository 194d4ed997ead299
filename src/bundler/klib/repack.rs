//! Artifact repacker.
//!
//! Injects a module's resource bundle into its freshly compiled library:
//!
//! 1. Unpack the library into a scratch directory next to it
//! 2. Read `unique_name` from the library manifest
//! 3. Compile the asset catalog in the generation root (warning-only)
//! 4. Write the bundle under `resources/` in the unpacked tree
//! 5. Re-archive into a staging file and rename it over the original
//!
//! The scratch directory is removed on every exit path. The original library
//! is only replaced once the new archive has been written completely.

use super::{RESOURCES_DIR_NAME, manifest::read_unique_name};
use crate::{
    bail,
    bundler::{
        Settings,
        archive::Archive,
        assets::{AssetCompileOutcome, AssetCompiler},
        error::{ErrorExt, Result},
        resources::{BundleSpec, ResourceBundle, write_bundle},
        utils::checksum::directory_sha256,
    },
};
use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

/// Result of repacking one library.
#[derive(Clone, Debug)]
pub struct RepackReport {
    /// The library that was rewritten.
    pub artifact: PathBuf,
    /// Library unique name (also the bundle name).
    pub unique_name: String,
    /// Bundle as written inside the library; `root` is relative to the library root.
    pub bundle: ResourceBundle,
    /// What happened to the asset catalog.
    pub assets: AssetCompileOutcome,
    /// SHA-256 over the bundle's relative paths and bytes.
    pub content_digest: String,
}

/// Rewrites compiled libraries to carry a resource bundle.
#[derive(Clone, Debug)]
pub struct ArtifactRepacker {
    settings: Settings,
    archive: Arc<dyn Archive>,
    asset_compiler: AssetCompiler,
}

impl ArtifactRepacker {
    /// Creates a repacker for the module described by `settings`.
    pub fn new(settings: Settings, archive: Arc<dyn Archive>) -> Self {
        let asset_compiler = AssetCompiler::from_settings(&settings);
        Self {
            settings,
            archive,
            asset_compiler,
        }
    }

    /// Injects the module's resources into `artifact`.
    ///
    /// # Errors
    ///
    /// Fails if the library cannot be unpacked or re-archived, its manifest
    /// has no unique name, or the generation root cannot be read. On failure
    /// the original library is left untouched.
    pub async fn repack(&self, artifact: &Path) -> Result<RepackReport> {
        let metadata = tokio::fs::metadata(artifact)
            .await
            .fs_context("reading compiled library", artifact)?;
        if !metadata.is_file() {
            bail!("compiled library {} is not a file", artifact.display());
        }

        let parent = artifact
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let stem = artifact
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "library".to_string());

        let scratch = tempfile::Builder::new()
            .prefix(&format!(".{stem}-repack-"))
            .tempdir_in(parent)
            .fs_context("creating repack directory", parent)?;
        let repack_dir = scratch.path().join(&stem);

        log::info!("Repacking {} with module resources", artifact.display());

        {
            let archive = Arc::clone(&self.archive);
            let artifact = artifact.to_path_buf();
            let repack_dir = repack_dir.clone();
            tokio::task::spawn_blocking(move || archive.extract(&artifact, &repack_dir)).await??;
        }

        let unique_name = read_unique_name(&repack_dir).await?;
        log::debug!("{} has unique name {}", artifact.display(), unique_name);

        let generation_dir = self.settings.generation_dir();
        let assets = self
            .asset_compiler
            .compile(&self.settings.assets_dir(), generation_dir)
            .await?;

        let spec = BundleSpec {
            bundle_name: unique_name.clone(),
            identifier: self.settings.bundle_identifier(),
            development_region: self.settings.development_region().to_string(),
        };
        let mut bundle =
            write_bundle(generation_dir, &repack_dir.join(RESOURCES_DIR_NAME), &spec).await?;
        let content_digest = directory_sha256(&bundle.root).await?;
        bundle.root = Path::new(RESOURCES_DIR_NAME).join(format!("{unique_name}.bundle"));

        let staged = tempfile::Builder::new()
            .prefix(&format!(".{stem}-"))
            .suffix(".tmp")
            .tempfile_in(parent)
            .fs_context("creating staging archive", parent)?;

        {
            let archive = Arc::clone(&self.archive);
            let repack_dir = repack_dir.clone();
            let staged_path = staged.path().to_path_buf();
            tokio::task::spawn_blocking(move || archive.compress(&repack_dir, &staged_path))
                .await??;
        }

        // Staging files are created owner-only; keep the library's own mode.
        tokio::fs::set_permissions(staged.path(), metadata.permissions())
            .await
            .fs_context("copying library permissions", staged.path())?;

        staged
            .persist(artifact)
            .map_err(|e| e.error)
            .fs_context("replacing compiled library", artifact)?;

        drop(scratch);

        log::info!(
            "✓ Repacked {} with bundle {}.bundle ({} file(s))",
            artifact.display(),
            unique_name,
            bundle.file_count
        );

        Ok(RepackReport {
            artifact: artifact.to_path_buf(),
            unique_name,
            bundle,
            assets,
            content_digest,
        })
    }
}
