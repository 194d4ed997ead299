//! Error types for the resource pipeline.
//!
//! Every stage reports fatal failures through [`Error`]. Asset compilation
//! failures are not errors; see [`crate::bundler::assets::AssetCompileOutcome`].

use std::{
    fmt::Display,
    io,
    path::{Path, PathBuf},
};
use thiserror::Error as DeriveError;

/// Result type alias for resource pipeline operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the bundle writer, repacker, merge walker and stage orchestrator.
#[derive(Debug, DeriveError)]
#[non_exhaustive]
pub enum Error {
    /// Plain I/O error without path context.
    #[error("{0}")]
    IoError(#[from] io::Error),

    /// I/O error on a specific path.
    #[error("{context} {}: {error}", .path.display())]
    Fs {
        /// What was being attempted.
        context: String,
        /// Path the operation failed on.
        path: PathBuf,
        /// Underlying error.
        #[source]
        error: io::Error,
    },

    /// Compiled library archive could not be read or written.
    #[error("archive error on {}: {error}", .path.display())]
    Archive {
        /// Archive path.
        path: PathBuf,
        /// Underlying zip error.
        #[source]
        error: zip::result::ZipError,
    },

    /// Bundle Info.plist could not be written or parsed.
    #[error("Info.plist error on {}: {error}", .path.display())]
    Plist {
        /// Info.plist path.
        path: PathBuf,
        /// Underlying plist error.
        #[source]
        error: plist::Error,
    },

    /// Follow-up registry file could not be parsed or serialized.
    #[error("JSON error on {}: {error}", .path.display())]
    Json {
        /// Registry file path.
        path: PathBuf,
        /// Underlying serde_json error.
        #[source]
        error: serde_json::Error,
    },

    /// Library manifest is missing or lacks a required key.
    #[error("malformed library manifest {}: {reason}", .path.display())]
    Manifest {
        /// Manifest path inside the unpacked library.
        path: PathBuf,
        /// What is wrong with it.
        reason: String,
    },

    /// A lifecycle hook was invoked out of order or twice.
    #[error("stage `{stage}` rejected for module `{module}`: {reason}")]
    StageOrder {
        /// Module the hook was invoked for.
        module: String,
        /// Hook name.
        stage: &'static str,
        /// Why the transition is not allowed.
        reason: String,
    },

    /// Walkdir traversal error.
    #[error("directory traversal failed: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Path prefix stripping failed.
    #[error("path prefix error: {0}")]
    StripPrefix(#[from] std::path::StripPrefixError),

    /// Blocking task failed to complete.
    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// Any other failure.
    #[error("{0}")]
    GenericError(String),
}

/// Attaches filesystem context to I/O results.
pub trait ErrorExt<T> {
    /// Wraps the error with a description of the attempted operation and the path.
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> ErrorExt<T> for std::result::Result<T, io::Error> {
    fn fs_context(self, context: &str, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|error| Error::Fs {
            context: context.to_string(),
            path: path.as_ref().to_path_buf(),
            error,
        })
    }
}

/// Adds a message to errors and missing values.
pub trait Context<T> {
    /// Converts into [`Error::GenericError`] carrying `context`.
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T>;

    /// Like [`Context::context`], computing the message lazily.
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T> Context<T> for Result<T> {
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T> {
        self.map_err(|e| Error::GenericError(format!("{context}: {e}")))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| Error::GenericError(format!("{}: {e}", f())))
    }
}

impl<T> Context<T> for Option<T> {
    fn context<C: Display + Send + Sync + 'static>(self, context: C) -> Result<T> {
        self.ok_or_else(|| Error::GenericError(context.to_string()))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.ok_or_else(|| Error::GenericError(f().to_string()))
    }
}

/// Returns early with an [`Error::GenericError`] built from a format string.
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::bundler::Error::GenericError(format!($($arg)*)))
    };
}
