//! Resource bundle writer.
//!
//! Produces loadable bundles with the layout
//!
//! ```text
//! <destination>/<name>.bundle/
//!     Contents/
//!         Info.plist
//!         Resources/
//!             ...resource payload...
//! ```
//!
//! Writing is idempotent: an existing bundle with the same name is replaced,
//! never merged into.

mod loadable;

pub use loadable::{BundleDescriptor, BundleSpec, LoadableBundle, ResourceBundle, write_bundle};
