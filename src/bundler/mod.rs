//! Resource bundle propagation for native library builds.
//!
//! A module's resources travel with its compiled library and are copied into
//! every framework or test binary that links it:
//!
//! - [`resources`] writes a loadable bundle from a resource tree
//! - [`assets`] compiles the module's asset catalog with an external tool
//! - [`klib`] repacks a compiled library with its bundle, and merges bundles
//!   out of upstream libraries at link time
//! - [`stage`] binds both to the host build's compile and link hooks
//!
//! # Examples
//!
//! ```no_run
//! use kodegen_bundler_resources::bundler::{
//!     Platform, SettingsBuilder,
//!     archive::ZipArchiver,
//!     stage::{FollowUpRegistry, StageOrchestrator},
//! };
//! use std::{path::Path, sync::Arc};
//!
//! # async fn example() -> kodegen_bundler_resources::bundler::Result<()> {
//! let settings = SettingsBuilder::new()
//!     .resources_package("com.example.shared")
//!     .platform(Platform::IosSimulatorArm64)
//!     .generation_dir("build/generated/res")
//!     .build()?;
//!
//! let mut module = StageOrchestrator::new(
//!     "shared",
//!     settings,
//!     Arc::new(ZipArchiver),
//!     Arc::new(FollowUpRegistry::new()),
//! );
//! let report = module.on_compile_complete(Path::new("build/shared.klib")).await?;
//! println!("bundle digest {}", report.content_digest);
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod assets;
pub mod error;
pub mod klib;
pub mod resources;
pub mod settings;
pub mod stage;
pub mod utils;

pub use error::{Error, Result};
pub use settings::{BuildConfiguration, Platform, Settings, SettingsBuilder};
