//! Shared state behind the tool handlers.

use precache_client::{ClientId, Registration};
use precache_core::{AppConfig, Error};
use url::Url;

/// Everything a tool call needs.
pub struct AppState {
    /// Settings the server booted with; new versions derive from these.
    pub config: AppConfig,
    pub registration: Registration,
    /// The page opened at startup; tool fetches go through it by default.
    pub client: ClientId,
}

impl AppState {
    /// Store of the active worker, or the configured one before any activation.
    pub async fn current_store(&self) -> String {
        match self.registration.active().await {
            Some(manager) => manager.store_name().to_string(),
            None => self.config.store_name(),
        }
    }

    /// Resolve a tool-supplied URL against the app scope.
    pub fn resolve_url(&self, input: &str) -> Result<Url, Error> {
        let base = precache_client::fetch::parse_base(&self.config.base_url)
            .map_err(|e| Error::InvalidUrl(format!("base_url: {e}")))?;
        precache_client::fetch::resolve(&base, input).map_err(|e| Error::InvalidUrl(format!("{input}: {e}")))
    }
}
