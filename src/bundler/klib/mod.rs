//! Compiled library (`.klib`) handling.
//!
//! - [`manifest`] reads the library's unique name
//! - [`ArtifactRepacker`] injects a resource bundle into a library after compile
//! - [`ResourceMergeWalker`] copies bundles out of upstream libraries at link time

pub mod manifest;
mod merge;
mod repack;

pub use manifest::{LibraryManifest, MANIFEST_FILE_NAME, UNIQUE_NAME_KEY, read_unique_name};
pub use merge::{MergeReport, ResourceMergeWalker};
pub use repack::{ArtifactRepacker, RepackReport};

/// Directory at the library root that holds embedded resource bundles.
pub const RESOURCES_DIR_NAME: &str = "resources";
