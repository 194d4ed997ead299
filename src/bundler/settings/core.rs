//! Core Settings struct and implementations.

use super::{AssetCompilerSettings, Platform};
use std::path::{Path, PathBuf};

/// Suffix appended to the resources package to form the bundle identifier.
pub const BUNDLE_IDENTIFIER_SUFFIX: &str = "MR";

/// Main settings for one module's resource pipeline.
///
/// Constructed via [`SettingsBuilder`](super::SettingsBuilder). Holds the
/// resources package, the base localization region, the target platform and
/// where the generator left its output.
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_resources::bundler::{Platform, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_resources::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .resources_package("com.example.library")
///     .platform(Platform::IosArm64)
///     .generation_dir("build/generated/moko/iosArm64Main/res")
///     .build()?;
///
/// assert_eq!(settings.bundle_identifier(), "com.example.library.MR");
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Settings {
    /// Package the resource accessors are generated into.
    resources_package: String,

    /// Base localization region (CFBundleDevelopmentRegion).
    development_region: String,

    /// Target platform of the compiled library.
    platform: Platform,

    /// Resource generation root (the ResourceSet).
    generation_dir: PathBuf,

    /// Name of the asset catalog directory inside the generation root.
    assets_dir_name: String,

    /// File extension of compiled library archives.
    library_extension: String,

    /// External asset compiler configuration.
    asset_compiler: AssetCompilerSettings,

    /// Suppresses the static framework notice.
    disable_static_framework_warning: bool,
}

impl Settings {
    /// Returns the resources package.
    pub fn resources_package(&self) -> &str {
        &self.resources_package
    }

    /// Returns the bundle identifier (`<package>.MR`).
    pub fn bundle_identifier(&self) -> String {
        format!("{}.{}", self.resources_package, BUNDLE_IDENTIFIER_SUFFIX)
    }

    /// Returns the base localization region.
    pub fn development_region(&self) -> &str {
        &self.development_region
    }

    /// Returns the target platform.
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Returns the resource generation root.
    pub fn generation_dir(&self) -> &Path {
        &self.generation_dir
    }

    /// Returns the asset catalog source directory inside the generation root.
    pub fn assets_dir(&self) -> PathBuf {
        self.generation_dir.join(&self.assets_dir_name)
    }

    /// Returns the compiled library file extension (without dot).
    pub fn library_extension(&self) -> &str {
        &self.library_extension
    }

    /// Returns the asset compiler configuration.
    pub fn asset_compiler(&self) -> &AssetCompilerSettings {
        &self.asset_compiler
    }

    /// Returns the `--platform` value for the asset compiler.
    pub fn asset_compiler_platform(&self) -> &str {
        self.asset_compiler
            .platform
            .as_deref()
            .unwrap_or_else(|| self.platform.asset_catalog_platform())
    }

    /// Whether linking a static framework should log a notice.
    pub fn warn_on_static_framework(&self) -> bool {
        !self.disable_static_framework_warning
    }

    /// Creates a new Settings instance (used by SettingsBuilder).
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        resources_package: String,
        development_region: String,
        platform: Platform,
        generation_dir: PathBuf,
        assets_dir_name: String,
        library_extension: String,
        asset_compiler: AssetCompilerSettings,
        disable_static_framework_warning: bool,
    ) -> Self {
        Self {
            resources_package,
            development_region,
            platform,
            generation_dir,
            assets_dir_name,
            library_extension,
            asset_compiler,
            disable_static_framework_warning,
        }
    }
}
