//! One worker version and its lifecycle.
//!
//! A `Manager` moves through `Installing -> Installed -> Active -> Superseded`.
//! Each transition function takes the resources it needs (storage, network,
//! clients) as arguments; the manager itself only owns its configuration and
//! state.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use futures_util::future::{join_all, try_join_all};
use precache_core::{CacheDb, CacheStore, Error};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::clients::Clients;
use super::config::WorkerConfig;
use crate::fetch::{CacheRequest, FetchResponse, Network};

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Created; install has not finished.
    Installing,
    /// Installed and waiting to be activated.
    Installed,
    /// Controls pages and intercepts their fetches.
    Active,
    /// Replaced by a newer worker.
    Superseded,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Active => "active",
            WorkerState::Superseded => "superseded",
        };
        f.write_str(name)
    }
}

/// Outcome of an install.
#[derive(Debug, Clone, Serialize)]
pub struct InstallReport {
    pub store_name: String,
    /// Number of manifest URLs.
    pub requested: usize,
    /// Number of entries written (0 or `requested`).
    pub stored: usize,
    /// Why the precache batch failed, if it did. Install still succeeds.
    pub error: Option<String>,
}

/// Outcome of an activation.
#[derive(Debug, Clone, Serialize)]
pub struct ActivationReport {
    pub store_name: String,
    /// Stale stores removed.
    pub deleted: Vec<String>,
    /// Stale stores whose deletion failed.
    pub failed: Vec<String>,
    /// Pages that switched to this worker.
    pub claimed: usize,
}

/// Where a served response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseSource {
    Cache,
    Network,
    /// The offline fallback page, served after cache and network both failed.
    Fallback,
    /// Not intercepted; plain network fetch by the host.
    Passthrough,
}

impl ResponseSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseSource::Cache => "cache",
            ResponseSource::Network => "network",
            ResponseSource::Fallback => "fallback",
            ResponseSource::Passthrough => "passthrough",
        }
    }
}

/// A response handed back to a page.
#[derive(Debug, Clone)]
pub struct Served {
    pub source: ResponseSource,
    /// Whether a copy of a network response was written to the store.
    pub stored: bool,
    pub response: FetchResponse,
}

/// A single worker version.
pub struct Manager {
    config: WorkerConfig,
    state: RwLock<WorkerState>,
    waiting_skipped: AtomicBool,
}

impl Manager {
    pub fn new(config: WorkerConfig) -> Self {
        Self { config, state: RwLock::new(WorkerState::Installing), waiting_skipped: AtomicBool::new(false) }
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn version(&self) -> &str {
        &self.config.version
    }

    pub fn store_name(&self) -> &str {
        &self.config.store_name
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.read().await
    }

    /// Whether install asked to skip the waiting phase.
    pub fn skips_waiting(&self) -> bool {
        self.waiting_skipped.load(Ordering::SeqCst)
    }

    async fn require_state(&self, allowed: &[WorkerState], action: &str) -> Result<(), Error> {
        let state = self.state().await;
        if allowed.contains(&state) {
            Ok(())
        } else {
            Err(Error::InvalidState(format!("cannot {action} worker {} while {state}", self.config.version)))
        }
    }

    async fn transition(&self, allowed: &[WorkerState], to: WorkerState) -> Result<(), Error> {
        let mut state = self.state.write().await;
        if !allowed.contains(&*state) {
            return Err(Error::InvalidState(format!(
                "worker {} cannot move from {} to {to}",
                self.config.version, *state
            )));
        }
        tracing::info!(version = %self.config.version, from = %*state, to = %to, "worker state change");
        *state = to;
        Ok(())
    }

    /// Install this worker: open its store and precache the manifest.
    ///
    /// The manifest is fetched concurrently and written as one batch; if any
    /// fetch fails or returns a non-2xx status nothing is written. That
    /// failure is logged and reported but does not fail the install.
    pub async fn install(&self, db: &CacheDb, network: &dyn Network) -> Result<InstallReport, Error> {
        self.require_state(&[WorkerState::Installing], "install").await?;

        if self.config.skip_waiting {
            self.waiting_skipped.store(true, Ordering::SeqCst);
        }

        let requested = self.config.manifest.len();
        let report = match self.precache(db, network).await {
            Ok(stored) => {
                tracing::info!(store = %self.config.store_name, stored, "precached manifest");
                InstallReport { store_name: self.config.store_name.clone(), requested, stored, error: None }
            }
            Err(e) => {
                tracing::error!(store = %self.config.store_name, "precaching manifest failed during install: {e}");
                InstallReport { store_name: self.config.store_name.clone(), requested, stored: 0, error: Some(e.to_string()) }
            }
        };

        self.transition(&[WorkerState::Installing], WorkerState::Installed).await?;
        Ok(report)
    }

    async fn precache(&self, db: &CacheDb, network: &dyn Network) -> Result<usize, Error> {
        let store = db.open_store(&self.config.store_name).await?;

        let fetches = self.config.manifest.iter().map(|url| async move {
            let response = network.fetch(&CacheRequest::get(url.clone())).await?;
            if !response.status.is_success() {
                return Err(Error::BatchFailed(format!("{url} returned status {}", response.status.as_u16())));
            }
            Ok(response.to_stored())
        });

        let entries = try_join_all(fetches).await.map_err(|e| match e {
            Error::BatchFailed(_) => e,
            other => Error::BatchFailed(other.to_string()),
        })?;

        store.put_all(&entries).await
    }

    /// Activate this worker.
    ///
    /// Deletes every store except this worker's own, in parallel. A failed
    /// deletion is logged and does not stop the others. Then claims open
    /// pages when configured to.
    pub async fn activate(&self, db: &CacheDb, clients: &Clients) -> Result<ActivationReport, Error> {
        self.require_state(&[WorkerState::Installed], "activate").await?;

        let store_name = self.config.store_name.as_str();
        let names = match db.store_names().await {
            Ok(names) => names,
            Err(e) => {
                tracing::warn!(store = store_name, "could not list cache stores: {e}");
                Vec::new()
            }
        };

        let stale: Vec<String> = names.into_iter().filter(|name| name != store_name).collect();
        let outcomes = join_all(stale.iter().map(|name| async move { (name, db.delete_store(name).await) })).await;

        let mut deleted = Vec::new();
        let mut failed = Vec::new();
        for (name, outcome) in outcomes {
            match outcome {
                Ok(true) => {
                    tracing::info!("deleted stale cache store {name}");
                    deleted.push(name.clone());
                }
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("failed to delete stale cache store {name}: {e}");
                    failed.push(name.clone());
                }
            }
        }

        let claimed = if self.config.claim_clients { clients.claim(store_name).await } else { 0 };

        self.transition(&[WorkerState::Installed], WorkerState::Active).await?;

        Ok(ActivationReport { store_name: store_name.to_string(), deleted, failed, claimed })
    }

    /// Retire this worker in favour of a newer one.
    pub async fn supersede(&self) -> Result<(), Error> {
        self.transition(&[WorkerState::Installed, WorkerState::Active], WorkerState::Superseded)
            .await
    }

    /// Resolve a request cache-first.
    ///
    /// Returns `Ok(None)` for requests this worker does not intercept
    /// (anything but GET); the host fetches those itself.
    pub async fn handle_fetch(
        &self, db: &CacheDb, network: &dyn Network, request: &CacheRequest,
    ) -> Result<Option<Served>, Error> {
        if !request.is_get() {
            tracing::debug!("not intercepting {} {}", request.method, request.url);
            return Ok(None);
        }

        self.require_state(&[WorkerState::Active], "intercept fetches for").await?;

        let start = Instant::now();
        let url = request.url.as_str();
        let store = db.open_store(&self.config.store_name).await?;

        if let Some(entry) = store.match_request("GET", url).await? {
            tracing::debug!("cache hit for {url}");
            let mut response = FetchResponse::from_stored(entry)?;
            response.fetch_ms = start.elapsed().as_millis() as u64;
            return Ok(Some(Served { source: ResponseSource::Cache, stored: false, response }));
        }

        tracing::debug!("cache miss for {url}");

        match network.fetch(request).await {
            Ok(response) => {
                let stored = self.store_copy(&store, request, &response).await;
                Ok(Some(Served { source: ResponseSource::Network, stored, response }))
            }
            Err(err) => {
                if let Some(served) = self.offline_fallback(&store, request).await {
                    tracing::warn!("network failed for {url}, serving offline fallback: {err}");
                    return Ok(Some(served));
                }
                tracing::warn!("fetch failed for {url}: {err}");
                Err(err)
            }
        }
    }

    async fn store_copy(&self, store: &CacheStore, request: &CacheRequest, response: &FetchResponse) -> bool {
        let policy = &self.config.storage_policy;
        if !policy.allows(request.url.as_str(), response.status.as_u16(), response.response_type) {
            tracing::debug!("not storing {} ({} policy)", request.url, policy.name());
            return false;
        }

        match store.put(&response.to_stored()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("failed to store {}: {e}", request.url);
                false
            }
        }
    }

    async fn offline_fallback(&self, store: &CacheStore, request: &CacheRequest) -> Option<Served> {
        let fallback = self.config.offline_fallback.as_ref()?;
        if !request.accepts_html() {
            return None;
        }

        match store.match_request("GET", fallback.as_str()).await {
            Ok(Some(entry)) => match FetchResponse::from_stored(entry) {
                Ok(response) => Some(Served { source: ResponseSource::Fallback, stored: false, response }),
                Err(e) => {
                    tracing::warn!("offline fallback {fallback} is unreadable: {e}");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("offline fallback lookup failed: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StubNetwork;
    use precache_core::{AppConfig, StoragePolicy};
    use reqwest::{Method, header};
    use url::Url;

    const ORIGIN: &str = "https://app.test/";

    fn config(version: &str, manifest: &[&str]) -> WorkerConfig {
        let app = AppConfig {
            version: version.into(),
            base_url: ORIGIN.into(),
            manifest: manifest.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        };
        WorkerConfig::from_app(&app).unwrap()
    }

    fn get(url: &str) -> CacheRequest {
        CacheRequest::get(Url::parse(url).unwrap())
    }

    async fn active_manager(db: &CacheDb, network: &StubNetwork, config: WorkerConfig) -> Manager {
        let manager = Manager::new(config);
        manager.install(db, network).await.unwrap();
        manager.activate(db, &Clients::new()).await.unwrap();
        manager
    }

    #[tokio::test]
    async fn test_install_precaches_manifest() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN)
            .respond("https://app.test/", 200, "root")
            .respond("https://app.test/index.html", 200, "index");
        let manager = Manager::new(config("v1", &["./", "index.html"]));

        let report = manager.install(&db, &network).await.unwrap();
        assert_eq!(report.requested, 2);
        assert_eq!(report.stored, 2);
        assert!(report.error.is_none());
        assert!(manager.skips_waiting());
        assert_eq!(manager.state().await, WorkerState::Installed);

        let store = db.open_store("v1").await.unwrap();
        assert!(store.match_request("GET", "https://app.test/").await.unwrap().is_some());
        assert!(store.match_request("GET", "https://app.test/index.html").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_repeated_install_does_not_duplicate() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN).respond("https://app.test/a.html", 200, "a");

        Manager::new(config("v1", &["/a.html"])).install(&db, &network).await.unwrap();
        Manager::new(config("v1", &["/a.html"])).install(&db, &network).await.unwrap();

        let store = db.open_store("v1").await.unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
        assert_eq!(db.store_names().await.unwrap(), vec!["v1".to_string()]);
    }

    #[tokio::test]
    async fn test_install_batch_is_all_or_nothing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN)
            .respond("https://app.test/a.html", 200, "a")
            .respond("https://app.test/b.html", 404, "missing");
        let manager = Manager::new(config("v1", &["/a.html", "/b.html"]));

        let report = manager.install(&db, &network).await.unwrap();
        assert_eq!(report.stored, 0);
        assert!(report.error.unwrap().contains("BATCH_FAILED"));
        assert_eq!(manager.state().await, WorkerState::Installed);

        // the store exists but holds nothing
        let store = db.open_store("v1").await.unwrap();
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_install_network_failure_is_swallowed() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN).fail("https://app.test/a.html");
        let manager = Manager::new(config("v1", &["/a.html"]));

        let report = manager.install(&db, &network).await.unwrap();
        assert!(report.error.is_some());
        assert_eq!(manager.state().await, WorkerState::Installed);
    }

    #[tokio::test]
    async fn test_install_twice_is_invalid() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN);
        let manager = Manager::new(config("v1", &[]));

        manager.install(&db, &network).await.unwrap();
        assert!(matches!(manager.install(&db, &network).await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_activate_deletes_other_stores() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_store("v0").await.unwrap();
        db.open_store("coach-v0").await.unwrap();
        let network = StubNetwork::new(ORIGIN).respond("https://app.test/a.html", 200, "a");

        let manager = Manager::new(config("v1", &["/a.html"]));
        manager.install(&db, &network).await.unwrap();
        let report = manager.activate(&db, &Clients::new()).await.unwrap();

        assert_eq!(report.deleted, vec!["v0".to_string(), "coach-v0".to_string()]);
        assert!(report.failed.is_empty());
        assert_eq!(db.store_names().await.unwrap(), vec!["v1".to_string()]);
        assert_eq!(manager.state().await, WorkerState::Active);
    }

    #[tokio::test]
    async fn test_activate_failed_deletion_does_not_block_others() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.sqlite");
        let db = CacheDb::open(&path).await.unwrap();
        for name in ["v0", "pinned", "coach-v0"] {
            db.open_store(name).await.unwrap();
        }

        // a second connection pins one store so deleting it aborts
        let side = tokio_rusqlite::Connection::open(&path).await.unwrap();
        side.call(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER pin_store BEFORE DELETE ON cache_stores
                 WHEN OLD.name = 'pinned'
                 BEGIN SELECT RAISE(ABORT, 'store is pinned'); END;",
            )
        })
        .await
        .unwrap();

        let network = StubNetwork::new(ORIGIN);
        let manager = Manager::new(config("v1", &[]));
        manager.install(&db, &network).await.unwrap();
        let report = manager.activate(&db, &Clients::new()).await.unwrap();

        assert_eq!(report.deleted, vec!["v0".to_string(), "coach-v0".to_string()]);
        assert_eq!(report.failed, vec!["pinned".to_string()]);
        assert_eq!(manager.state().await, WorkerState::Active);
        assert_eq!(db.store_names().await.unwrap(), vec!["pinned".to_string(), "v1".to_string()]);
    }

    #[tokio::test]
    async fn test_activate_claims_clients() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN);
        let clients = Clients::new();
        let page = clients.open(None).await;

        let manager = Manager::new(config("v1", &[]));
        manager.install(&db, &network).await.unwrap();
        let report = manager.activate(&db, &clients).await.unwrap();

        assert_eq!(report.claimed, 1);
        assert_eq!(clients.controller(page).await.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_activate_without_claim() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN);
        let clients = Clients::new();
        let page = clients.open(None).await;

        let mut worker_config = config("v1", &[]);
        worker_config.claim_clients = false;
        let manager = Manager::new(worker_config);
        manager.install(&db, &network).await.unwrap();
        let report = manager.activate(&db, &clients).await.unwrap();

        assert_eq!(report.claimed, 0);
        assert_eq!(clients.controller(page).await, None);
    }

    #[tokio::test]
    async fn test_activate_before_install_is_invalid() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let manager = Manager::new(config("v1", &[]));
        assert!(matches!(manager.activate(&db, &Clients::new()).await, Err(Error::InvalidState(_))));
    }

    #[tokio::test]
    async fn test_supersede() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN);
        let manager = active_manager(&db, &network, config("v1", &[])).await;

        manager.supersede().await.unwrap();
        assert_eq!(manager.state().await, WorkerState::Superseded);
        assert!(manager.supersede().await.is_err());
        assert!(matches!(
            manager.handle_fetch(&db, &network, &get("https://app.test/a.html")).await,
            Err(Error::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_hit_skips_network() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN).respond("https://app.test/a.html", 200, "cached a");
        let manager = active_manager(&db, &network, config("v1", &["/a.html"])).await;
        let before = network.total_calls();

        let served = manager
            .handle_fetch(&db, &network, &get("https://app.test/a.html"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(&served.response.bytes[..], b"cached a");
        assert_eq!(network.total_calls(), before);
    }

    #[tokio::test]
    async fn test_fetch_hit_is_served_verbatim_even_if_stale() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN).respond("https://app.test/a.html", 200, "v1 body");
        let manager = active_manager(&db, &network, config("v1", &["/a.html"])).await;
        network.go_offline("https://app.test/a.html");

        let served = manager
            .handle_fetch(&db, &network, &get("https://app.test/a.html"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(served.source, ResponseSource::Cache);
        assert_eq!(&served.response.bytes[..], b"v1 body");
    }

    #[tokio::test]
    async fn test_fetch_miss_populates_store() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN).respond("https://app.test/missing.js", 200, "js");
        let manager = active_manager(&db, &network, config("v1", &[])).await;
        let request = get("https://app.test/missing.js");

        let first = manager.handle_fetch(&db, &network, &request).await.unwrap().unwrap();
        assert_eq!(first.source, ResponseSource::Network);
        assert!(first.stored);
        assert_eq!(&first.response.bytes[..], b"js");

        let second = manager.handle_fetch(&db, &network, &request).await.unwrap().unwrap();
        assert_eq!(second.source, ResponseSource::Cache);
        assert_eq!(network.calls("https://app.test/missing.js"), 1);
    }

    #[tokio::test]
    async fn test_fetch_non_get_is_not_intercepted() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN).respond("https://app.test/api", 200, "{}");
        let manager = active_manager(&db, &network, config("v1", &[])).await;
        let request = CacheRequest::new(Method::POST, Url::parse("https://app.test/api").unwrap()).with_body("{}");

        assert!(manager.handle_fetch(&db, &network, &request).await.unwrap().is_none());
        assert_eq!(network.total_calls(), 0);
        assert!(db.open_store("v1").await.unwrap().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_excluded_substring_never_stored() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let url = "https://mental-coach.firebaseio.com/sessions.json";
        let network = StubNetwork::new(ORIGIN).respond(url, 200, "{}");
        let manager = active_manager(&db, &network, config("v1", &[])).await;

        for _ in 0..3 {
            let served = manager.handle_fetch(&db, &network, &get(url)).await.unwrap().unwrap();
            assert_eq!(served.source, ResponseSource::Network);
            assert!(!served.stored);
        }

        assert_eq!(network.calls(url), 3);
        assert!(db.open_store("v1").await.unwrap().is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_fetch_successful_basic_only_policy() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let mut cors = header::HeaderMap::new();
        cors.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, header::HeaderValue::from_static("*"));
        let network = StubNetwork::new(ORIGIN)
            .respond("https://app.test/gone.js", 404, "nope")
            .respond("https://cdn.test/lib.js", 200, "lib")
            .respond_with_headers("https://api.test/data.json", 200, "{}", cors)
            .respond("https://app.test/ok.js", 200, "ok");

        let mut worker_config = config("v1", &[]);
        worker_config.storage_policy = StoragePolicy::SuccessfulBasicOnly;
        let manager = active_manager(&db, &network, worker_config).await;

        for url in ["https://app.test/gone.js", "https://cdn.test/lib.js", "https://api.test/data.json"] {
            for _ in 0..2 {
                let served = manager.handle_fetch(&db, &network, &get(url)).await.unwrap().unwrap();
                assert_eq!(served.source, ResponseSource::Network);
                assert!(!served.stored, "{url} should not be stored");
            }
            assert_eq!(network.calls(url), 2);
        }

        let served = manager.handle_fetch(&db, &network, &get("https://app.test/ok.js")).await.unwrap().unwrap();
        assert!(served.stored);

        let store = db.open_store("v1").await.unwrap();
        assert_eq!(store.keys().await.unwrap(), vec!["https://app.test/ok.js".to_string()]);
    }

    #[tokio::test]
    async fn test_default_policy_stores_error_responses() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN).respond("https://app.test/gone.js", 404, "nope");
        let manager = active_manager(&db, &network, config("v1", &[])).await;

        let served = manager.handle_fetch(&db, &network, &get("https://app.test/gone.js")).await.unwrap().unwrap();
        assert!(served.stored);
        assert_eq!(served.response.status.as_u16(), 404);
    }

    #[tokio::test]
    async fn test_fetch_total_failure_propagates() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN).fail("https://app.test/down.js");
        let manager = active_manager(&db, &network, config("v1", &[])).await;

        let result = manager.handle_fetch(&db, &network, &get("https://app.test/down.js")).await;
        assert!(matches!(result, Err(Error::HttpError(_))));
    }

    #[tokio::test]
    async fn test_offline_fallback_for_html_requests() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let network = StubNetwork::new(ORIGIN)
            .respond("https://app.test/offline.html", 200, "you are offline")
            .fail("https://app.test/profile");
        let mut worker_config = config("v1", &["offline.html"]);
        worker_config.offline_fallback = Some(Url::parse("https://app.test/offline.html").unwrap());
        let manager = active_manager(&db, &network, worker_config).await;

        let page = get("https://app.test/profile").with_header("accept", "text/html");
        let served = manager.handle_fetch(&db, &network, &page).await.unwrap().unwrap();
        assert_eq!(served.source, ResponseSource::Fallback);
        assert_eq!(&served.response.bytes[..], b"you are offline");

        let script = get("https://app.test/profile").with_header("accept", "*/*");
        assert!(manager.handle_fetch(&db, &network, &script).await.is_err());
    }
}
