//! Asset catalog compilation.
//!
//! Runs the external asset compiler (`xcrun actool` by default) over the
//! module's asset catalog. Compiler failure is never fatal: the catalog is
//! left in place for inspection and the pipeline carries on. On success the
//! catalog sources are deleted, the compiled output having been written into
//! the destination by the tool.

mod process;

pub use process::{ProcessInvocation, ProcessOutput, run_process};

use crate::bundler::{
    Result, Settings,
    error::ErrorExt,
    settings::AssetCompilerSettings,
    utils::{fs, tool_detection::find_tool},
};
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

/// What happened to a module's asset catalog.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AssetCompileOutcome {
    /// The module has no asset catalog.
    NoCatalog,
    /// Compiled successfully; the sources were removed.
    Compiled,
    /// The compiler is not installed on this host; sources left in place.
    ToolUnavailable {
        /// Program that could not be found.
        program: String,
    },
    /// The compiler ran and failed; sources left in place.
    Failed {
        /// Exit code, if the process exited normally.
        exit_code: Option<i32>,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },
}

impl AssetCompileOutcome {
    /// Whether the catalog sources are still on disk after this outcome.
    pub fn sources_retained(&self) -> bool {
        matches!(self, Self::ToolUnavailable { .. } | Self::Failed { .. })
    }
}

/// Invokes the asset compiler for one platform.
#[derive(Clone, Debug)]
pub struct AssetCompiler {
    settings: AssetCompilerSettings,
    platform: String,
}

impl AssetCompiler {
    /// Creates a compiler invoker targeting the given `--platform` value.
    pub fn new(settings: AssetCompilerSettings, platform: impl Into<String>) -> Self {
        Self {
            settings,
            platform: platform.into(),
        }
    }

    /// Creates a compiler invoker from module settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.asset_compiler().clone(),
            settings.asset_compiler_platform(),
        )
    }

    /// Builds the command line for compiling `catalog_dir` into `dest_dir`.
    ///
    /// The catalog is passed by file name with its parent as working directory.
    /// A destination equal to that parent is passed as `.`; any other
    /// destination must already be absolute, see [`AssetCompiler::compile`].
    pub fn invocation(
        &self,
        program: PathBuf,
        catalog_dir: &Path,
        dest_dir: &Path,
    ) -> ProcessInvocation {
        let catalog_arg = catalog_dir
            .file_name()
            .map(PathBuf::from)
            .unwrap_or_else(|| catalog_dir.to_path_buf());
        let working_dir = catalog_dir.parent().map(Path::to_path_buf);
        let dest_arg = if working_dir.as_deref() == Some(dest_dir) {
            PathBuf::from(".")
        } else {
            dest_dir.to_path_buf()
        };

        let mut args: Vec<OsString> = self.settings.args.iter().map(OsString::from).collect();
        args.push(catalog_arg.into_os_string());
        args.push("--compile".into());
        args.push(dest_arg.into_os_string());
        args.push("--platform".into());
        args.push(self.platform.clone().into());
        args.push("--minimum-deployment-target".into());
        args.push(self.settings.minimum_deployment_target.clone().into());

        ProcessInvocation {
            program,
            args,
            working_dir,
        }
    }

    /// Compiles `catalog_dir` into `dest_dir`.
    ///
    /// # Errors
    ///
    /// Only fails if removing the catalog after a successful compile fails.
    /// Compiler problems are reported through [`AssetCompileOutcome`].
    pub async fn compile(
        &self,
        catalog_dir: &Path,
        dest_dir: &Path,
    ) -> Result<AssetCompileOutcome> {
        if !catalog_dir.is_dir() {
            log::debug!("No asset catalog at {}", catalog_dir.display());
            return Ok(AssetCompileOutcome::NoCatalog);
        }

        // The tool runs inside the catalog's parent, so a relative
        // destination must not be resolved against it.
        let dest_dir = if dest_dir.is_relative() && catalog_dir.parent() != Some(dest_dir) {
            std::path::absolute(dest_dir).fs_context("resolving asset destination", dest_dir)?
        } else {
            dest_dir.to_path_buf()
        };

        let Some(program) = find_tool(&self.settings.program) else {
            log::warn!(
                "can't compile assets - {} not found; leaving {} uncompiled",
                self.settings.program,
                catalog_dir.display()
            );
            return Ok(AssetCompileOutcome::ToolUnavailable {
                program: self.settings.program.clone(),
            });
        };

        let invocation = self.invocation(program, catalog_dir, &dest_dir);
        let output = match run_process(&invocation).await {
            Ok(output) => output,
            Err(e) => {
                log::warn!("can't compile assets - failed to run `{}`: {}", invocation, e);
                return Ok(AssetCompileOutcome::Failed {
                    exit_code: None,
                    stdout: String::new(),
                    stderr: e.to_string(),
                });
            }
        };

        if !output.success() {
            log::warn!(
                "can't compile assets - {:?}\nstdout:\n{}\nstderr:\n{}",
                output.exit_code,
                output.stdout,
                output.stderr
            );
            return Ok(AssetCompileOutcome::Failed {
                exit_code: output.exit_code,
                stdout: output.stdout,
                stderr: output.stderr,
            });
        }

        fs::remove_dir_all(catalog_dir).await?;
        log::info!("Compiled asset catalog {}", catalog_dir.display());
        Ok(AssetCompileOutcome::Compiled)
    }
}
