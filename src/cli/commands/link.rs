//! `framework-link` and `test-link` commands.

use super::orchestrator;
use crate::{
    bundler::{
        BuildConfiguration,
        klib::MergeReport,
        stage::{FollowUpRegistry, FrameworkLink},
    },
    cli::args::{LinkArgs, ModuleArgs},
    config::ResourcesConfig,
    error::Result,
};
use std::{path::Path, sync::Arc};

/// Options specific to framework links.
#[derive(Debug, Clone)]
pub struct FrameworkOptions {
    /// Statically linked framework
    pub is_static: bool,
    /// Build configuration
    pub configuration: BuildConfiguration,
    /// Host link task name
    pub link_task: Option<String>,
}

fn print_merge(output_dir: &Path, report: &MergeReport) {
    println!(
        "{}: {} file(s) from {} of {} librar{}",
        output_dir.display(),
        report.files_copied,
        report.with_resources,
        report.scanned,
        if report.scanned == 1 { "y" } else { "ies" }
    );
}

/// Merges upstream resources into a framework and records any follow-up.
///
/// With `follow_ups_path`, the registry is loaded from and merged back into
/// that JSON file, so repeated or concurrent invocations accumulate into one
/// set of entries.
pub async fn framework_link(
    module: &ModuleArgs,
    config: ResourcesConfig,
    link: &LinkArgs,
    options: FrameworkOptions,
    follow_ups_path: Option<&Path>,
) -> Result<i32> {
    let follow_ups = match follow_ups_path {
        Some(path) => FollowUpRegistry::load(path).await?,
        None => FollowUpRegistry::new(),
    };
    let follow_ups = Arc::new(follow_ups);

    let mut stage = orchestrator(module, config, Arc::clone(&follow_ups))?
        .resume_compiled(link.artifact.clone());

    let mut framework = FrameworkLink::new(
        &link.output_dir,
        stage.settings().platform(),
        options.configuration,
    )
    .upstream(link.upstream.iter().cloned())
    .static_framework(options.is_static);
    if let Some(task) = options.link_task {
        framework = framework.link_task(task);
    }

    let report = stage.on_framework_link_complete(framework).await?;
    print_merge(&link.output_dir, &report.merge);

    if let Some(registration) = &report.follow_up {
        println!("{} -> {}", registration.entry_point, registration.copy_task);
        match follow_ups_path {
            Some(path) => follow_ups.save(path).await?,
            None => log::debug!("No follow-up file given; registration not persisted"),
        }
    }
    Ok(0)
}

/// Merges upstream resources next to a test executable.
pub async fn test_link(
    module: &ModuleArgs,
    config: ResourcesConfig,
    link: &LinkArgs,
) -> Result<i32> {
    let mut stage = orchestrator(module, config, Arc::new(FollowUpRegistry::new()))?
        .resume_compiled(link.artifact.clone());

    let report = stage
        .on_test_link_complete(&link.output_dir, &link.upstream)
        .await?;
    print_merge(&link.output_dir, &report);
    Ok(0)
}
