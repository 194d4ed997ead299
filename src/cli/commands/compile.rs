//! `compile-complete` command.

use super::orchestrator;
use crate::{
    bundler::stage::FollowUpRegistry,
    cli::args::ModuleArgs,
    config::ResourcesConfig,
    error::Result,
};
use std::{path::Path, sync::Arc};

/// Repacks `artifact` with the module's resource bundle.
pub async fn compile_complete(
    module: &ModuleArgs,
    config: ResourcesConfig,
    artifact: &Path,
) -> Result<i32> {
    let mut stage = orchestrator(module, config, Arc::new(FollowUpRegistry::new()))?;
    let report = stage.on_compile_complete(artifact).await?;

    if report.assets.sources_retained() {
        log::warn!("Asset catalog left uncompiled for {}", stage.module());
    }

    println!(
        "{}: {} ({} file(s), sha256 {})",
        report.artifact.display(),
        report.bundle.root.display(),
        report.bundle.file_count,
        report.content_digest
    );
    Ok(0)
}
