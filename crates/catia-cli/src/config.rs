//! Capture options file resolution and loading.
//!
//! Priority for the options file:
//! 1. `--config <PATH>` (explicit, must exist)
//! 2. `CATIA_CONFIG` (explicit override, ignores empty string, must exist)
//! 3. `~/.catia/config.json` (used when present)
//! 4. Built-in defaults

use std::env;
use std::path::{Path, PathBuf};

use catia_core::error::ApiError;
use catia_core::options::CaptureOptions;
use thiserror::Error;
use tracing::debug;

/// Environment variable naming the options file.
pub const CONFIG_ENV: &str = "CATIA_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ApiError,
    },
}

/// Where an options file path came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named by the user; a missing file is an error.
    Explicit(PathBuf),
    /// The per-user default; a missing file means defaults.
    Default(PathBuf),
}

impl ConfigSource {
    pub fn path(&self) -> &Path {
        match self {
            ConfigSource::Explicit(path) | ConfigSource::Default(path) => path,
        }
    }
}

/// Default options file under the home directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".catia").join("config.json"))
}

/// Resolve which options file to use, if any.
pub fn resolve_config_path(explicit: Option<&Path>) -> Option<ConfigSource> {
    // 1. Command line
    if let Some(path) = explicit {
        return Some(ConfigSource::Explicit(path.to_path_buf()));
    }

    // 2. Environment (ignore empty)
    if let Ok(path) = env::var(CONFIG_ENV) {
        if !path.is_empty() {
            return Some(ConfigSource::Explicit(PathBuf::from(path)));
        }
    }

    // 3. Home directory
    default_config_path().map(ConfigSource::Default)
}

/// Read and parse one options file.
pub fn read_options(path: &Path) -> Result<CaptureOptions, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    CaptureOptions::from_json(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Load capture options following the lookup priority.
pub fn load_options(explicit: Option<&Path>) -> Result<CaptureOptions, ConfigError> {
    let source = match resolve_config_path(explicit) {
        Some(ConfigSource::Default(path)) if !path.is_file() => None,
        source => source,
    };
    let Some(source) = source else {
        debug!("No options file, using defaults");
        return Ok(CaptureOptions::default());
    };

    debug!("Loading options from {}", source.path().display());
    read_options(source.path())
}
