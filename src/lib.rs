//! Resource bundle packaging and propagation for multi-target native library builds.
//!
//! Each module's resources are written into a loadable bundle, injected into
//! its compiled library, and copied out again into every framework or test
//! executable that links the library.
//!
//! It can be used both as a CLI tool driven by the host build and as a
//! library dependency.

pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use error::{BundlerError, CliError, Result};
