//! Per-dialog cache of scene placeholder registries.
//!
//! A debug dialog looks the registry up several times (validation, kind
//! resolution, panel defaults). The first lookup of a scene fetches it; any
//! lookup issued while that fetch is in flight waits for the same result
//! instead of sending a second request. A failed fetch leaves the slot empty
//! so the next lookup retries.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use common::model::place_holder::PlaceholderRegistry;
use tokio::sync::OnceCell;

use crate::api::ApiClient;
use crate::error::Result;

type Slot = Arc<OnceCell<Arc<PlaceholderRegistry>>>;

#[derive(Debug)]
pub struct RegistryCache {
    client: ApiClient,
    slots: Mutex<HashMap<String, Slot>>,
}

impl RegistryCache {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            slots: Mutex::new(HashMap::new()),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    fn slot(&self, scene: &str) -> Slot {
        // Entries are only inserted or cleared, so a poisoned map is still valid.
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots
            .entry(scene.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Returns the scene's registry, fetching it at most once at a time.
    pub async fn get(&self, scene: &str) -> Result<Arc<PlaceholderRegistry>> {
        let slot = self.slot(scene);
        let registry = slot
            .get_or_try_init(|| async {
                let registry = self.client.fetch_registry(scene).await?;
                log::debug!(
                    "cached {} placeholder(s) for scene {}",
                    registry.placeholders.len(),
                    scene
                );
                Ok::<_, crate::error::ConsoleError>(Arc::new(registry))
            })
            .await?;
        Ok(registry.clone())
    }

    /// Returns the registry only if it is already cached.
    pub fn cached(&self, scene: &str) -> Option<Arc<PlaceholderRegistry>> {
        let slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.get(scene).and_then(|slot| slot.get().cloned())
    }

    /// Drops every cached registry. Lookups in flight still complete but
    /// their results are not kept.
    pub fn clear(&self) {
        let mut slots = self.slots.lock().unwrap_or_else(|p| p.into_inner());
        slots.clear();
    }
}
