//! Command execution for the three lifecycle hooks.
//!
//! Each invocation builds a fresh [`StageOrchestrator`] for the module. Link
//! hooks resume it in the compiled state since the compile hook ran in an
//! earlier process.

mod compile;
mod link;

pub use compile::compile_complete;
pub use link::{FrameworkOptions, framework_link, test_link};

use super::args::ModuleArgs;
use crate::{
    bundler::{
        Settings,
        archive::ZipArchiver,
        stage::{FollowUpRegistry, StageOrchestrator},
    },
    config::ResourcesConfig,
    error::Result,
};
use std::sync::Arc;

fn module_settings(module: &ModuleArgs, config: ResourcesConfig) -> Result<Settings> {
    Ok(module.settings_builder(config).build()?)
}

fn orchestrator(
    module: &ModuleArgs,
    config: ResourcesConfig,
    follow_ups: Arc<FollowUpRegistry>,
) -> Result<StageOrchestrator> {
    let settings = module_settings(module, config)?;
    Ok(StageOrchestrator::new(
        module.module.clone(),
        settings,
        Arc::new(ZipArchiver),
        follow_ups,
    ))
}
