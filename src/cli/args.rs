//! Command line argument parsing.
//!
//! Every module setting can come from `resources.toml`, an environment
//! variable or a flag; flags win.

use crate::{
    bundler::{BuildConfiguration, Platform, SettingsBuilder, settings::AssetCompilerSettings},
    config::ResourcesConfig,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Resource bundle propagation for native library builds
#[derive(Parser, Debug)]
#[command(
    name = "kodegen_bundler_resources",
    version,
    about = "Resource bundle propagation for native library builds",
    long_about = "Packages a module's resources into its compiled library and copies them into linked frameworks and test executables.

Call once per lifecycle point of a module build:
  kodegen_bundler_resources compile-complete --artifact build/shared.klib
  kodegen_bundler_resources framework-link --output-dir build/shared.framework --upstream build/core.klib --static --configuration Release
  kodegen_bundler_resources test-link --output-dir build/test.kexe.dir --upstream build/core.klib

Exit code 0 = every resource copy for the stage completed."
)]
pub struct Args {
    /// Configuration file (defaults to ./resources.toml when present)
    #[arg(short, long, global = true, env = "KODEGEN_RESOURCES_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Lifecycle hook to run
    #[command(subcommand)]
    pub command: Command,
}

/// Lifecycle hooks.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Inject the module's resource bundle into its compiled library
    CompileComplete {
        #[command(flatten)]
        module: ModuleArgs,

        /// Compiled library produced by the compile step
        #[arg(long, value_name = "LIBRARY")]
        artifact: PathBuf,
    },

    /// Copy upstream resources into a linked framework
    FrameworkLink {
        #[command(flatten)]
        module: ModuleArgs,

        #[command(flatten)]
        link: LinkArgs,

        /// Framework is statically linked
        #[arg(long = "static")]
        is_static: bool,

        /// Build configuration: Debug or Release
        #[arg(long, value_parser = parse_configuration, default_value = "Debug")]
        configuration: BuildConfiguration,

        /// Host link task name (defaults to link<Configuration>Framework<Platform>)
        #[arg(long, value_name = "TASK")]
        link_task: Option<String>,

        /// JSON file accumulating follow-up copy tasks across invocations
        #[arg(long, env = "KODEGEN_RESOURCES_FOLLOW_UPS", value_name = "PATH")]
        follow_ups: Option<PathBuf>,
    },

    /// Copy upstream resources next to a linked test executable
    TestLink {
        #[command(flatten)]
        module: ModuleArgs,

        #[command(flatten)]
        link: LinkArgs,
    },
}

/// Inputs shared by both link hooks.
#[derive(clap::Args, Debug, Clone)]
pub struct LinkArgs {
    /// Link output directory
    #[arg(long, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Upstream library consumed by the link step (repeatable, in link order)
    #[arg(long = "upstream", value_name = "LIBRARY")]
    pub upstream: Vec<PathBuf>,

    /// The module's own repacked library, merged after the upstream libraries
    #[arg(long, value_name = "LIBRARY")]
    pub artifact: Option<PathBuf>,
}

/// Module settings; each overrides the config file.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct ModuleArgs {
    /// Module name used in messages
    #[arg(long, env = "KODEGEN_RESOURCES_MODULE", default_value = "module")]
    pub module: String,

    /// Resources package; the bundle identifier is <PACKAGE>.MR
    #[arg(long, env = "KODEGEN_RESOURCES_PACKAGE")]
    pub package: Option<String>,

    /// Bundle development region
    #[arg(long, env = "KODEGEN_RESOURCES_DEVELOPMENT_REGION")]
    pub development_region: Option<String>,

    /// Target platform, e.g. iosArm64
    #[arg(long, env = "KODEGEN_RESOURCES_PLATFORM", value_parser = parse_platform)]
    pub platform: Option<Platform>,

    /// Resource generation root
    #[arg(long, env = "KODEGEN_RESOURCES_GENERATION_DIR", value_name = "DIR")]
    pub generation_dir: Option<PathBuf>,

    /// Asset catalog directory name inside the generation root
    #[arg(long)]
    pub assets_dir_name: Option<String>,

    /// Compiled library extension
    #[arg(long)]
    pub library_extension: Option<String>,

    /// Asset compiler program (run with no extra arguments when set)
    #[arg(long, env = "KODEGEN_RESOURCES_ASSET_COMPILER", value_name = "PROGRAM")]
    pub asset_compiler: Option<String>,

    /// Minimum deployment target passed to the asset compiler
    #[arg(long)]
    pub minimum_deployment_target: Option<String>,

    /// Do not warn about static frameworks
    #[arg(long)]
    pub disable_static_framework_warning: bool,
}

impl ModuleArgs {
    /// Layers these flags over `config`.
    pub fn settings_builder(&self, config: ResourcesConfig) -> SettingsBuilder {
        let mut compiler = config.asset_compiler.clone().unwrap_or_default();
        let compiler_overridden =
            self.asset_compiler.is_some() || self.minimum_deployment_target.is_some();
        if let Some(program) = &self.asset_compiler {
            compiler = AssetCompilerSettings {
                program: program.clone(),
                args: Vec::new(),
                ..compiler
            };
        }
        if let Some(version) = &self.minimum_deployment_target {
            compiler.minimum_deployment_target = version.clone();
        }

        let mut builder = config.into_builder();
        if compiler_overridden {
            builder = builder.asset_compiler(compiler);
        }
        if let Some(package) = &self.package {
            builder = builder.resources_package(package);
        }
        if let Some(region) = &self.development_region {
            builder = builder.development_region(region);
        }
        if let Some(platform) = self.platform {
            builder = builder.platform(platform);
        }
        if let Some(dir) = &self.generation_dir {
            builder = builder.generation_dir(dir);
        }
        if let Some(name) = &self.assets_dir_name {
            builder = builder.assets_dir_name(name);
        }
        if let Some(extension) = &self.library_extension {
            builder = builder.library_extension(extension);
        }
        if self.disable_static_framework_warning {
            builder = builder.disable_static_framework_warning(true);
        }
        builder
    }
}

fn parse_platform(value: &str) -> Result<Platform, String> {
    value.parse().map_err(|e: crate::bundler::Error| e.to_string())
}

fn parse_configuration(value: &str) -> Result<BuildConfiguration, String> {
    value.parse().map_err(|e: crate::bundler::Error| e.to_string())
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
