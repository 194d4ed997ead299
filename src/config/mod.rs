//! `resources.toml` configuration file.
//!
//! ```toml
//! [resources]
//! package = "com.example.shared"
//! development_region = "en"
//! platform = "iosArm64"
//! generation_dir = "build/generated/res"
//! disable_static_framework_warning = true
//!
//! [resources.asset_compiler]
//! minimum_deployment_target = "12.0"
//! ```
//!
//! Relative `generation_dir` values resolve against the directory holding
//! the config file. Command line flags override every value.

use crate::{
    bundler::{Platform, SettingsBuilder, settings::AssetCompilerSettings},
    error::{BundlerError, Result},
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Default config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "resources.toml";

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    resources: ResourcesConfig,
}

/// The `[resources]` table.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ResourcesConfig {
    /// Resources package; the bundle identifier is `<package>.MR`.
    pub package: Option<String>,
    /// Bundle development region.
    pub development_region: Option<String>,
    /// Target platform.
    pub platform: Option<Platform>,
    /// Resource generation root.
    pub generation_dir: Option<PathBuf>,
    /// Asset catalog directory name inside the generation root.
    pub assets_dir_name: Option<String>,
    /// Compiled library file extension.
    pub library_extension: Option<String>,
    /// Suppresses the static framework warning.
    pub disable_static_framework_warning: Option<bool>,
    /// Asset compiler invocation.
    pub asset_compiler: Option<AssetCompilerSettings>,
}

impl ResourcesConfig {
    /// Seeds a [`SettingsBuilder`] with every value present in the file.
    pub fn into_builder(self) -> SettingsBuilder {
        let mut builder = SettingsBuilder::new();
        if let Some(package) = self.package {
            builder = builder.resources_package(package);
        }
        if let Some(region) = self.development_region {
            builder = builder.development_region(region);
        }
        if let Some(platform) = self.platform {
            builder = builder.platform(platform);
        }
        if let Some(dir) = self.generation_dir {
            builder = builder.generation_dir(dir);
        }
        if let Some(name) = self.assets_dir_name {
            builder = builder.assets_dir_name(name);
        }
        if let Some(extension) = self.library_extension {
            builder = builder.library_extension(extension);
        }
        if let Some(compiler) = self.asset_compiler {
            builder = builder.asset_compiler(compiler);
        }
        if let Some(disable) = self.disable_static_framework_warning {
            builder = builder.disable_static_framework_warning(disable);
        }
        builder
    }
}

/// Parses `contents` as a config file located in `base_dir`.
pub fn parse_config(contents: &str, base_dir: &Path, path: &Path) -> Result<ResourcesConfig> {
    let file: ConfigFile = toml::from_str(contents).map_err(|error| BundlerError::Toml {
        path: path.to_path_buf(),
        error,
    })?;

    let mut config = file.resources;
    if let Some(dir) = config.generation_dir.take() {
        config.generation_dir = Some(if dir.is_relative() {
            base_dir.join(dir)
        } else {
            dir
        });
    }
    Ok(config)
}

/// Loads the config file at `path`.
pub async fn load_config(path: &Path) -> Result<ResourcesConfig> {
    let contents = tokio::fs::read_to_string(path).await?;
    let base_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    log::debug!("Loaded configuration from {}", path.display());
    parse_config(&contents, base_dir, path)
}

/// Loads `path` if given, else `resources.toml` in the working directory if it exists.
pub async fn discover_config(path: Option<&Path>) -> Result<ResourcesConfig> {
    match path {
        Some(path) => load_config(path).await,
        None => {
            let default = Path::new(CONFIG_FILE_NAME);
            if tokio::fs::try_exists(default).await? {
                load_config(default).await
            } else {
                Ok(ResourcesConfig::default())
            }
        }
    }
}
