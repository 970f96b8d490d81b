//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (PRECACHE_*)
//! 2. TOML config file (if PRECACHE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::policy::StoragePolicy;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (PRECACHE_*)
/// 2. TOML config file (if PRECACHE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite cache storage database.
    ///
    /// Set via PRECACHE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Worker version. Embedded in the store name; bumping it invalidates
    /// every previously cached response.
    ///
    /// Set via PRECACHE_VERSION environment variable.
    #[serde(default = "default_version")]
    pub version: String,

    /// Optional application prefix for the store name (`{prefix}-{version}`).
    #[serde(default)]
    pub cache_prefix: Option<String>,

    /// Scope of the app. Relative manifest entries resolve against it and
    /// its origin decides which responses are same-origin.
    ///
    /// Set via PRECACHE_BASE_URL environment variable.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Resources cached at install time, relative to `base_url` or absolute.
    ///
    /// Set via PRECACHE_MANIFEST as an array, e.g. `["./","index.html"]`.
    #[serde(default = "default_manifest")]
    pub manifest: Vec<String>,

    /// Which network responses are written back on a cache miss.
    #[serde(default)]
    pub storage_policy: StoragePolicy,

    /// Cached page served to HTML requests when both cache and network fail.
    #[serde(default)]
    pub offline_fallback: Option<String>,

    /// Activate a freshly installed worker without waiting for pages
    /// controlled by the previous one to close.
    #[serde(default = "default_true")]
    pub skip_waiting: bool,

    /// Take control of already open pages on activation.
    #[serde(default = "default_true")]
    pub claim_clients: bool,

    /// User-Agent string for network requests.
    ///
    /// Set via PRECACHE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via PRECACHE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via PRECACHE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./precache.sqlite")
}

fn default_version() -> String {
    "v1".into()
}

fn default_base_url() -> String {
    "http://localhost:8080/".into()
}

fn default_manifest() -> Vec<String> {
    vec!["./".into(), "index.html".into(), "manifest.json".into()]
}

fn default_user_agent() -> String {
    "precache/0.1".into()
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_true() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            version: default_version(),
            cache_prefix: None,
            base_url: default_base_url(),
            manifest: default_manifest(),
            storage_policy: StoragePolicy::default(),
            offline_fallback: None,
            skip_waiting: true,
            claim_clients: true,
            user_agent: default_user_agent(),
            max_bytes: default_max_bytes(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Name of the store owned by this version.
    pub fn store_name(&self) -> String {
        match self.cache_prefix.as_deref() {
            Some(prefix) if !prefix.is_empty() => format!("{prefix}-{}", self.version),
            _ => self.version.clone(),
        }
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("PRECACHE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("PRECACHE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
