//! Builder for constructing Settings.

use super::{AssetCompilerSettings, Platform, Settings};
use std::path::{Path, PathBuf};

/// Default base localization region.
pub const DEFAULT_DEVELOPMENT_REGION: &str = "en";

/// Default asset catalog directory name.
pub const DEFAULT_ASSETS_DIR_NAME: &str = "Assets.xcassets";

/// Default compiled library extension.
pub const DEFAULT_LIBRARY_EXTENSION: &str = "klib";

/// Builder for constructing [`Settings`].
///
/// # Examples
///
/// ```no_run
/// use kodegen_bundler_resources::bundler::{Platform, SettingsBuilder};
///
/// # fn example() -> kodegen_bundler_resources::bundler::Result<()> {
/// let settings = SettingsBuilder::new()
///     .resources_package("com.example.library")
///     .development_region("de")
///     .platform(Platform::IosX64)
///     .generation_dir("build/generated/res")
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
    resources_package: Option<String>,
    development_region: Option<String>,
    platform: Option<Platform>,
    generation_dir: Option<PathBuf>,
    assets_dir_name: Option<String>,
    library_extension: Option<String>,
    asset_compiler: AssetCompilerSettings,
    disable_static_framework_warning: bool,
}

impl SettingsBuilder {
    /// Creates a new settings builder.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the resources package.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn resources_package(mut self, package: impl Into<String>) -> Self {
        self.resources_package = Some(package.into());
        self
    }

    /// Sets the base localization region.
    ///
    /// Default: "en"
    pub fn development_region(mut self, region: impl Into<String>) -> Self {
        self.development_region = Some(region.into());
        self
    }

    /// Sets the target platform.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Sets the resource generation root.
    ///
    /// # Required
    ///
    /// This field is required for building.
    pub fn generation_dir<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.generation_dir = Some(path.as_ref().to_path_buf());
        self
    }

    /// Sets the asset catalog directory name.
    ///
    /// Default: "Assets.xcassets"
    pub fn assets_dir_name(mut self, name: impl Into<String>) -> Self {
        self.assets_dir_name = Some(name.into());
        self
    }

    /// Sets the compiled library extension.
    ///
    /// Default: "klib"
    pub fn library_extension(mut self, extension: impl Into<String>) -> Self {
        self.library_extension = Some(extension.into());
        self
    }

    /// Sets the asset compiler configuration.
    pub fn asset_compiler(mut self, settings: AssetCompilerSettings) -> Self {
        self.asset_compiler = settings;
        self
    }

    /// Suppresses the static framework notice.
    ///
    /// Default: false
    pub fn disable_static_framework_warning(mut self, disable: bool) -> Self {
        self.disable_static_framework_warning = disable;
        self
    }

    /// Builds the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if required fields are missing or empty:
    /// - `resources_package`
    /// - `platform`
    /// - `generation_dir`
    pub fn build(self) -> crate::bundler::Result<Settings> {
        use crate::bundler::error::Context;

        let resources_package = self
            .resources_package
            .filter(|p| !p.trim().is_empty())
            .context("resources_package is required")?;

        let library_extension = self
            .library_extension
            .unwrap_or_else(|| DEFAULT_LIBRARY_EXTENSION.to_string())
            .trim_start_matches('.')
            .to_string();

        Ok(Settings::new(
            resources_package,
            self.development_region
                .unwrap_or_else(|| DEFAULT_DEVELOPMENT_REGION.to_string()),
            self.platform.context("platform is required")?,
            self.generation_dir.context("generation_dir is required")?,
            self.assets_dir_name
                .unwrap_or_else(|| DEFAULT_ASSETS_DIR_NAME.to_string()),
            library_extension,
            self.asset_compiler,
            self.disable_static_framework_warning,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_applies_defaults() {
        let settings = SettingsBuilder::new()
            .resources_package("com.example.lib")
            .platform(Platform::IosArm64)
            .generation_dir("/tmp/res")
            .build()
            .unwrap();

        assert_eq!(settings.bundle_identifier(), "com.example.lib.MR");
        assert_eq!(settings.development_region(), "en");
        assert_eq!(settings.library_extension(), "klib");
        assert_eq!(settings.assets_dir(), PathBuf::from("/tmp/res/Assets.xcassets"));
        assert_eq!(settings.asset_compiler_platform(), "iphoneos");
        assert!(settings.warn_on_static_framework());
    }

    #[test]
    fn asset_platform_override_wins() {
        let settings = SettingsBuilder::new()
            .resources_package("com.example.lib")
            .platform(Platform::IosX64)
            .generation_dir("/tmp/res")
            .library_extension(".klib")
            .asset_compiler(AssetCompilerSettings {
                platform: Some("iphoneos".into()),
                ..Default::default()
            })
            .build()
            .unwrap();

        assert_eq!(settings.asset_compiler_platform(), "iphoneos");
        assert_eq!(settings.library_extension(), "klib");
    }

    #[test]
    fn missing_package_is_rejected() {
        let err = SettingsBuilder::new()
            .resources_package("  ")
            .platform(Platform::IosArm64)
            .generation_dir("/tmp/res")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("resources_package"));
    }

    #[test]
    fn missing_platform_is_rejected() {
        let err = SettingsBuilder::new()
            .resources_package("com.example.lib")
            .generation_dir("/tmp/res")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("platform"));
    }
}
