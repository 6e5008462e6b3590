// this_file: src/config.rs
//! Service configuration.
//!
//! Settings are resolved with the following priority:
//! 1. CLI arguments (highest priority)
//! 2. Config file (TOML, passed via `--config`)
//! 3. Default values (lowest priority)

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Content types accepted for uploads and URL downloads.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png"];

/// Runtime settings with production-safe defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Host to bind to.
    pub host: String,

    /// Port to listen on.
    pub port: u16,

    /// Maximum upload / download size in bytes.
    pub max_file_size: usize,

    /// Maximum image width or height before downscaling.
    pub max_dimension: u32,

    /// Maximum number of cached analysis results before LRU eviction.
    pub cache_max_entries: usize,

    /// Seconds after which a cached result is considered stale.
    pub cache_ttl_seconds: u64,

    /// Timeout for downloading an image from a URL, in seconds.
    pub fetch_timeout_seconds: u64,

    /// Comma-separated allowed CORS origins, or "*" for all.
    pub allowed_origins: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_file_size: 5 * 1024 * 1024,
            max_dimension: 512,
            cache_max_entries: 128,
            cache_ttl_seconds: 3600,
            fetch_timeout_seconds: 10,
            allowed_origins: "*".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file, falling back to defaults when `path`
    /// is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path)?;
                toml::from_str(&raw)
                    .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
            }
            None => Ok(Self::default()),
        }
    }

    /// Cache TTL as a `Duration`.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    /// Fetch timeout as a `Duration`.
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_seconds)
    }
}
