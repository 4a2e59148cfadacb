//! Engine configuration
//!
//! Storage location and discovery mode are resolved once, before the run,
//! and handed to the engine explicitly.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable overriding the store file location
pub const STORE_FILE_ENV: &str = "ACHIEVEMENTS_FILE";

/// Store file name used when no override is given, relative to the working directory
pub const DEFAULT_STORE_FILE: &str = ".achievements";

/// How the engine loads, persists and discovers achievements
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Store file; `None` runs entirely in memory (nothing loaded or saved)
    pub storage_path: Option<PathBuf>,
    /// Instantiate every registered kind that is not unlocked yet
    pub discovery_enabled: bool,
}

impl EngineConfig {
    /// Store file from `ACHIEVEMENTS_FILE` or `.achievements`, discovery on
    pub fn from_env() -> Self {
        Self {
            storage_path: Some(resolve_storage_path(std::env::var_os(STORE_FILE_ENV))),
            discovery_enabled: true,
        }
    }

    /// No persistence and no discovery, for driving the engine directly
    pub fn in_memory() -> Self {
        Self {
            storage_path: None,
            discovery_enabled: false,
        }
    }

    pub fn with_storage_path(mut self, path: impl AsRef<Path>) -> Self {
        self.storage_path = Some(absolute(path.as_ref()));
        self
    }

    pub fn without_storage(mut self) -> Self {
        self.storage_path = None;
        self
    }

    pub fn with_discovery(mut self, enabled: bool) -> Self {
        self.discovery_enabled = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Pick the store file from an override (empty counts as unset) or the default name
pub fn resolve_storage_path(env_override: Option<OsString>) -> PathBuf {
    let raw = env_override
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_FILE));
    absolute(&raw)
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
