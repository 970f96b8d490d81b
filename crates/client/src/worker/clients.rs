//! Open pages and the worker controlling each.
//!
//! A page is controlled by the store name of the worker that was active
//! when it opened, or by whichever worker later claimed it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Identifier of an open page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client-{}", self.0)
    }
}

/// Registry of open pages.
///
/// Uses a HashMap behind a tokio RwLock; clones share the same registry.
#[derive(Clone, Default)]
pub struct Clients {
    next_id: Arc<AtomicU64>,
    controllers: Arc<RwLock<HashMap<ClientId, Option<String>>>>,
}

impl Clients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new page, optionally controlled from the start.
    pub async fn open(&self, controller: Option<String>) -> ClientId {
        let id = ClientId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.controllers.write().await.insert(id, controller);
        id
    }

    /// Forget a page. Returns false if it was not open.
    pub async fn close(&self, id: ClientId) -> bool {
        self.controllers.write().await.remove(&id).is_some()
    }

    /// Store name of the worker controlling `id`, if any.
    pub async fn controller(&self, id: ClientId) -> Option<String> {
        self.controllers.read().await.get(&id).cloned().flatten()
    }

    /// Put every open page under `store_name`.
    ///
    /// Returns how many pages changed controller.
    pub async fn claim(&self, store_name: &str) -> usize {
        let mut controllers = self.controllers.write().await;
        let mut claimed = 0;
        for controller in controllers.values_mut() {
            if controller.as_deref() != Some(store_name) {
                *controller = Some(store_name.to_string());
                claimed += 1;
            }
        }
        claimed
    }

    /// Number of pages controlled by `store_name`.
    pub async fn controlled_by(&self, store_name: &str) -> usize {
        self.controllers
            .read()
            .await
            .values()
            .filter(|c| c.as_deref() == Some(store_name))
            .count()
    }

    pub async fn len(&self) -> usize {
        self.controllers.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.controllers.read().await.is_empty()
    }
}
