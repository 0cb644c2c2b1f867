use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("model weights '{0}' not found; place the file in ./models or the cache directory")]
    NotFound(String),
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Resolve a model file by name without touching the network.
///
/// Resolution order:
/// 1. Bundled path (for development / pre-packaged installs)
/// 2. User cache directory (platform-specific)
pub fn resolve(name: &str, bundled_dir: Option<&Path>) -> Result<PathBuf, ModelResolveError> {
    if let Some(dir) = bundled_dir {
        let bundled_path = dir.join(name);
        if bundled_path.exists() {
            return Ok(bundled_path);
        }
    }

    let cached_path = model_cache_dir()?.join(name);
    if cached_path.exists() {
        return Ok(cached_path);
    }

    Err(ModelResolveError::NotFound(name.to_string()))
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/Firewatch/models/`
/// - Linux: `$XDG_CACHE_HOME/Firewatch/models/` or `~/.cache/Firewatch/models/`
/// - Windows: `%LOCALAPPDATA%/Firewatch/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("Firewatch").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("Firewatch").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}
