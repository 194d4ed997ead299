//! Command line interface for the resource pipeline.
//!
//! One subcommand per lifecycle hook; the host build runs them in order for
//! each module.

mod args;
pub mod commands;

pub use args::{Args, Command, LinkArgs, ModuleArgs};

use crate::{config, error::Result};
use commands::FrameworkOptions;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    execute(Args::parse_args()).await
}

/// Runs already-parsed arguments.
pub async fn execute(args: Args) -> Result<i32> {
    let config = config::discover_config(args.config.as_deref()).await?;

    match args.command {
        Command::CompileComplete { module, artifact } => {
            commands::compile_complete(&module, config, &artifact).await
        }
        Command::FrameworkLink {
            module,
            link,
            is_static,
            configuration,
            link_task,
            follow_ups,
        } => {
            let options = FrameworkOptions {
                is_static,
                configuration,
                link_task,
            };
            commands::framework_link(&module, config, &link, options, follow_ups.as_deref()).await
        }
        Command::TestLink { module, link } => commands::test_link(&module, config, &link).await,
    }
}
