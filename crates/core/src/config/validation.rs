//! Configuration validation rules.
//!
//! Runs after `AppConfig` has been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use crate::policy::StoragePolicy;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// URL syntax of `base_url` and manifest entries is checked when the
    /// worker configuration is derived, since that needs URL resolution.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `version` is empty or contains whitespace or `/`
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` is empty
    /// - a manifest entry is blank
    /// - the storage policy excludes an empty substring (it would match every URL)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version.is_empty() {
            return Err(ConfigError::Invalid { field: "version".into(), reason: "must not be empty".into() });
        }
        if self.version.chars().any(|c| c.is_whitespace() || c == '/') {
            return Err(ConfigError::Invalid {
                field: "version".into(),
                reason: "must not contain whitespace or '/'".into(),
            });
        }

        if self.max_bytes == 0 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must be greater than 0".into() });
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(ConfigError::Invalid { field: "max_bytes".into(), reason: "must not exceed 50MB".into() });
        }

        if self.timeout_ms < 100 {
            return Err(ConfigError::Invalid { field: "timeout_ms".into(), reason: "must be at least 100ms".into() });
        }
        if self.timeout_ms > 300_000 {
            return Err(ConfigError::Invalid {
                field: "timeout_ms".into(),
                reason: "must not exceed 5 minutes (300000ms)".into(),
            });
        }

        if self.user_agent.is_empty() {
            return Err(ConfigError::Invalid { field: "user_agent".into(), reason: "must not be empty".into() });
        }

        if self.manifest.iter().any(|entry| entry.trim().is_empty()) {
            return Err(ConfigError::Invalid { field: "manifest".into(), reason: "entries must not be blank".into() });
        }

        if let StoragePolicy::ExcludeUrlSubstring { substrings } = &self.storage_policy
            && substrings.iter().any(String::is_empty)
        {
            return Err(ConfigError::Invalid {
                field: "storage_policy.substrings".into(),
                reason: "must not contain an empty substring".into(),
            });
        }

        if self.manifest.is_empty() {
            tracing::warn!(version = %self.version, "manifest is empty; install will cache nothing");
        }

        Ok(())
    }
}
