//! Target platform and build configuration types.

use crate::bundler::Error;
use std::{fmt, str::FromStr};

/// Native target a compiled library or framework is built for.
///
/// Names follow the host build system's camelCase target naming
/// (`iosArm64`, `iosSimulatorArm64`, ...).
///
/// # Examples
///
/// ```
/// use kodegen_bundler_resources::bundler::Platform;
///
/// let platform: Platform = "iosArm64".parse().unwrap();
/// assert_eq!(platform.asset_catalog_platform(), "iphoneos");
/// assert_eq!(platform.to_string(), "iosArm64");
/// ```
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Platform {
    /// iOS device (arm64)
    IosArm64,
    /// iOS simulator on Intel hosts
    IosX64,
    /// iOS simulator on Apple Silicon hosts
    IosSimulatorArm64,
    /// macOS on Intel
    MacosX64,
    /// macOS on Apple Silicon
    MacosArm64,
    /// tvOS device
    TvosArm64,
    /// tvOS simulator on Intel hosts
    TvosX64,
    /// tvOS simulator on Apple Silicon hosts
    TvosSimulatorArm64,
    /// watchOS device
    WatchosArm64,
    /// watchOS simulator on Intel hosts
    WatchosX64,
    /// watchOS simulator on Apple Silicon hosts
    WatchosSimulatorArm64,
}

impl Platform {
    /// All supported platforms.
    pub const ALL: [Platform; 11] = [
        Platform::IosArm64,
        Platform::IosX64,
        Platform::IosSimulatorArm64,
        Platform::MacosX64,
        Platform::MacosArm64,
        Platform::TvosArm64,
        Platform::TvosX64,
        Platform::TvosSimulatorArm64,
        Platform::WatchosArm64,
        Platform::WatchosX64,
        Platform::WatchosSimulatorArm64,
    ];

    /// Host build system name (`iosArm64`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::IosArm64 => "iosArm64",
            Platform::IosX64 => "iosX64",
            Platform::IosSimulatorArm64 => "iosSimulatorArm64",
            Platform::MacosX64 => "macosX64",
            Platform::MacosArm64 => "macosArm64",
            Platform::TvosArm64 => "tvosArm64",
            Platform::TvosX64 => "tvosX64",
            Platform::TvosSimulatorArm64 => "tvosSimulatorArm64",
            Platform::WatchosArm64 => "watchosArm64",
            Platform::WatchosX64 => "watchosX64",
            Platform::WatchosSimulatorArm64 => "watchosSimulatorArm64",
        }
    }

    /// Platform family passed to the asset catalog compiler (`--platform`).
    pub fn asset_catalog_platform(&self) -> &'static str {
        match self {
            Platform::IosArm64 => "iphoneos",
            Platform::IosX64 | Platform::IosSimulatorArm64 => "iphonesimulator",
            Platform::MacosX64 | Platform::MacosArm64 => "macosx",
            Platform::TvosArm64 => "appletvos",
            Platform::TvosX64 | Platform::TvosSimulatorArm64 => "appletvsimulator",
            Platform::WatchosArm64 => "watchos",
            Platform::WatchosX64 | Platform::WatchosSimulatorArm64 => "watchsimulator",
        }
    }

    /// Name with the first letter capitalized, as used in task names (`IosArm64`).
    pub fn task_suffix(&self) -> String {
        capitalize(self.as_str())
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Platform::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                Error::GenericError(format!(
                    "unknown platform `{s}` (expected one of: {})",
                    Platform::ALL.map(|p| p.as_str()).join(", ")
                ))
            })
    }
}

/// Build configuration of a linked binary.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[derive(serde::Deserialize, serde::Serialize)]
pub enum BuildConfiguration {
    /// Debug build
    #[serde(alias = "debug", alias = "DEBUG")]
    Debug,
    /// Release build
    #[serde(alias = "release", alias = "RELEASE")]
    Release,
}

impl BuildConfiguration {
    /// Xcode-style configuration name.
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildConfiguration::Debug => "Debug",
            BuildConfiguration::Release => "Release",
        }
    }
}

impl fmt::Display for BuildConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildConfiguration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("debug") {
            Ok(BuildConfiguration::Debug)
        } else if s.eq_ignore_ascii_case("release") {
            Ok(BuildConfiguration::Release)
        } else {
            Err(Error::GenericError(format!(
                "unknown build configuration `{s}` (expected Debug or Release)"
            )))
        }
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
