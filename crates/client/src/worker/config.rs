//! Immutable per-worker configuration.

use std::collections::HashSet;

use precache_core::{AppConfig, Error, StoragePolicy};
use url::Url;

use crate::fetch::{parse_base, resolve};

/// Everything one worker version needs, resolved once at construction.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub version: String,
    /// Name of the store this version owns; the single activation whitelist entry.
    pub store_name: String,
    pub scope: Url,
    /// Manifest entries resolved against `scope`, in declaration order.
    pub manifest: Vec<Url>,
    pub storage_policy: StoragePolicy,
    pub offline_fallback: Option<Url>,
    pub skip_waiting: bool,
    pub claim_clients: bool,
}

impl WorkerConfig {
    /// Derive a worker configuration from application settings.
    ///
    /// Fails on an unparsable scope, an unresolvable manifest entry, or two
    /// manifest entries resolving to the same URL.
    pub fn from_app(config: &AppConfig) -> Result<Self, Error> {
        let scope = parse_base(&config.base_url).map_err(|e| Error::InvalidUrl(format!("base_url: {e}")))?;

        let mut seen = HashSet::new();
        let mut manifest = Vec::with_capacity(config.manifest.len());
        for entry in &config.manifest {
            let url = resolve(&scope, entry).map_err(|e| Error::InvalidUrl(format!("manifest entry {entry:?}: {e}")))?;
            if !seen.insert(url.clone()) {
                return Err(Error::InvalidInput(format!("manifest lists {url} more than once")));
            }
            manifest.push(url);
        }

        let offline_fallback = config
            .offline_fallback
            .as_deref()
            .map(|entry| resolve(&scope, entry).map_err(|e| Error::InvalidUrl(format!("offline_fallback: {e}"))))
            .transpose()?;

        Ok(Self {
            version: config.version.clone(),
            store_name: config.store_name(),
            scope,
            manifest,
            storage_policy: config.storage_policy.clone(),
            offline_fallback,
            skip_waiting: config.skip_waiting,
            claim_clients: config.claim_clients,
        })
    }
}
