//! Host side of the worker lifecycle.
//!
//! `Registration` owns the storage, the network and the open pages, and
//! drives managers through install and activation. It keeps at most one
//! active and one waiting worker.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use precache_core::{CacheDb, Error};
use serde::Serialize;
use tokio::sync::Mutex;

use super::clients::{ClientId, Clients};
use super::config::WorkerConfig;
use super::manager::{ActivationReport, InstallReport, Manager, ResponseSource, Served};
use crate::fetch::{CacheRequest, Network};

/// Outcome of registering a worker version.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterReport {
    pub version: String,
    pub store_name: String,
    pub install: InstallReport,
    /// Present when the new worker was activated immediately.
    pub activation: Option<ActivationReport>,
}

#[derive(Default)]
struct Slots {
    active: Option<Arc<Manager>>,
    waiting: Option<Arc<Manager>>,
    /// Generation of the last registration that reached the slots.
    settled: u64,
}

/// Host for one app scope.
///
/// Owns the cache database, the network and the open pages. Clone the
/// `Arc` around it to share it between tasks.
pub struct Registration {
    db: CacheDb,
    network: Arc<dyn Network>,
    clients: Clients,
    generations: AtomicU64,
    slots: Mutex<Slots>,
}

impl Registration {
    pub fn new(db: CacheDb, network: Arc<dyn Network>) -> Self {
        Self { db, network, clients: Clients::new(), generations: AtomicU64::new(0), slots: Mutex::new(Slots::default()) }
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    pub fn clients(&self) -> &Clients {
        &self.clients
    }

    pub async fn active(&self) -> Option<Arc<Manager>> {
        self.slots.lock().await.active.clone()
    }

    pub async fn waiting(&self) -> Option<Arc<Manager>> {
        self.slots.lock().await.waiting.clone()
    }

    /// Install a worker version and activate it when allowed.
    ///
    /// The new worker activates right away if it skips waiting, if there is
    /// no active worker, or if no open page is controlled by the active one.
    /// Otherwise it waits, replacing any worker that was already waiting.
    ///
    /// Install runs without holding the slot lock, so the active worker keeps
    /// serving fetches while the new version precaches. If a later
    /// registration settles first, this worker is retired instead.
    pub async fn register(&self, config: WorkerConfig) -> Result<RegisterReport, Error> {
        let generation = self.generations.fetch_add(1, Ordering::SeqCst) + 1;
        let manager = Arc::new(Manager::new(config));
        tracing::info!(version = manager.version(), store = manager.store_name(), "registering worker");

        let install = manager.install(&self.db, self.network.as_ref()).await?;

        let mut slots = self.slots.lock().await;
        if generation < slots.settled {
            tracing::info!(version = manager.version(), "newer registration settled first, retiring worker");
            manager.supersede().await?;
            return Ok(RegisterReport {
                version: manager.version().to_string(),
                store_name: manager.store_name().to_string(),
                install,
                activation: None,
            });
        }
        slots.settled = generation;

        if let Some(previous) = slots.waiting.take()
            && let Err(e) = previous.supersede().await
        {
            tracing::warn!("could not retire waiting worker {}: {e}", previous.version());
        }

        let in_use = match &slots.active {
            Some(active) => self.clients.controlled_by(active.store_name()).await,
            None => 0,
        };

        let activation = if manager.skips_waiting() || in_use == 0 {
            Some(self.promote(&mut slots, Arc::clone(&manager)).await?)
        } else {
            tracing::info!(version = manager.version(), pages = in_use, "worker waiting for pages to close");
            slots.waiting = Some(Arc::clone(&manager));
            None
        };

        Ok(RegisterReport {
            version: manager.version().to_string(),
            store_name: manager.store_name().to_string(),
            install,
            activation,
        })
    }

    async fn promote(&self, slots: &mut Slots, manager: Arc<Manager>) -> Result<ActivationReport, Error> {
        let report = manager.activate(&self.db, &self.clients).await?;

        if let Some(previous) = slots.active.replace(manager)
            && let Err(e) = previous.supersede().await
        {
            tracing::warn!("could not retire worker {}: {e}", previous.version());
        }

        Ok(report)
    }

    /// Open a page. It is controlled by the active worker, if any.
    pub async fn open_client(&self) -> ClientId {
        let controller = self.active().await.map(|m| m.store_name().to_string());
        let id = self.clients.open(controller).await;
        tracing::debug!("opened {id}");
        id
    }

    /// Close a page. If that leaves the active worker unused, a waiting
    /// worker is activated and its report returned.
    pub async fn close_client(&self, id: ClientId) -> Result<Option<ActivationReport>, Error> {
        if !self.clients.close(id).await {
            return Err(Error::InvalidInput(format!("{id} is not open")));
        }
        tracing::debug!("closed {id}");

        let mut slots = self.slots.lock().await;
        let Some(waiting) = slots.waiting.clone() else {
            return Ok(None);
        };

        let in_use = match &slots.active {
            Some(active) => self.clients.controlled_by(active.store_name()).await,
            None => 0,
        };
        if in_use > 0 {
            return Ok(None);
        }

        slots.waiting = None;
        self.promote(&mut slots, waiting).await.map(Some)
    }

    /// Route a page's request.
    ///
    /// Requests from pages controlled by the active worker go through its
    /// fetch handler. Everything else, including requests the handler does
    /// not intercept, goes straight to the network.
    pub async fn dispatch_fetch(&self, client: Option<ClientId>, request: &CacheRequest) -> Result<Served, Error> {
        let controller = match client {
            Some(id) => self.clients.controller(id).await,
            None => None,
        };

        if let Some(manager) = self.active().await
            && controller.as_deref() == Some(manager.store_name())
            && let Some(served) = manager.handle_fetch(&self.db, self.network.as_ref(), request).await?
        {
            return Ok(served);
        }

        let response = self.network.fetch(request).await?;
        Ok(Served { source: ResponseSource::Passthrough, stored: false, response })
    }
}
