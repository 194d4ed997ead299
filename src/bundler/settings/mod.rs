//! Configuration structures for the resource pipeline.
//!
//! [`Settings`] carries everything one module's stages need: the resources
//! package, localization region, target platform, generation root and the
//! asset compiler invocation.

mod assets;
mod builder;
mod core;
mod platform;

pub use assets::AssetCompilerSettings;
pub use builder::{
    DEFAULT_ASSETS_DIR_NAME, DEFAULT_DEVELOPMENT_REGION, DEFAULT_LIBRARY_EXTENSION,
    SettingsBuilder,
};
pub use self::core::{BUNDLE_IDENTIFIER_SUFFIX, Settings};
pub(crate) use platform::capitalize;
pub use platform::{BuildConfiguration, Platform};
