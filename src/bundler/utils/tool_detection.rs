//! External tool detection and availability checking.
//!
//! The asset compiler is only present on hosts with Xcode installed; every
//! module of a build asks for it, so lookups are cached per program name.

use std::{
    collections::HashMap,
    path::PathBuf,
    sync::{LazyLock, Mutex},
};

static TOOL_CACHE: LazyLock<Mutex<HashMap<String, Option<PathBuf>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Resolves `program` on PATH (or as a path), caching the result.
///
/// Returns `None` when the tool cannot be found.
pub fn find_tool(program: &str) -> Option<PathBuf> {
    if let Ok(cache) = TOOL_CACHE.lock()
        && let Some(cached) = cache.get(program)
    {
        return cached.clone();
    }

    let resolved = match which::which(program) {
        Ok(path) => {
            log::debug!("Found {} at: {}", program, path.display());
            Some(path)
        }
        Err(e) => {
            log::debug!("{} not found in PATH: {}", program, e);
            None
        }
    };

    if let Ok(mut cache) = TOOL_CACHE.lock() {
        cache.insert(program.to_string(), resolved.clone());
    }
    resolved
}
