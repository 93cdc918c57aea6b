//! Named response stores.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::edge::{EdgeResponse, StoreRole};
use crate::error::Result;

// == Store Names ==
/// Names of the current deployment's stores, all tagged with its version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreNames {
    /// Generation name, used only to compare deployments
    pub umbrella: String,
    pub static_store: String,
    pub dynamic_store: String,
    pub api_store: String,
}

impl StoreNames {
    pub fn for_version(version: &str) -> Self {
        Self {
            umbrella: format!("app-cache-{version}"),
            static_store: format!("static-{version}"),
            dynamic_store: format!("dynamic-{version}"),
            api_store: format!("api-{version}"),
        }
    }

    pub fn for_role(&self, role: StoreRole) -> &str {
        match role {
            StoreRole::Static => &self.static_store,
            StoreRole::Dynamic => &self.dynamic_store,
            StoreRole::Api => &self.api_store,
        }
    }

    /// The three stores this deployment reads and writes.
    pub fn recognized(&self) -> [&str; 3] {
        [&self.static_store, &self.dynamic_store, &self.api_store]
    }

    pub fn is_recognized(&self, name: &str) -> bool {
        self.recognized().contains(&name)
    }
}

// == Store Backend ==
/// Storage for named stores of responses keyed by request.
///
/// Implementations must be safe to share between the request path and
/// background revalidation tasks.
#[async_trait]
pub trait StoreBackend: Send + Sync {
    /// Names of every existing store.
    async fn store_names(&self) -> Result<Vec<String>>;

    /// Creates the store if it does not exist.
    async fn open(&self, store: &str) -> Result<()>;

    /// Drops a whole store; returns whether it existed.
    async fn delete_store(&self, store: &str) -> Result<bool>;

    async fn lookup(&self, store: &str, key: &str) -> Result<Option<EdgeResponse>>;

    /// Stores `response`, creating the store if needed.
    async fn put(&self, store: &str, key: &str, response: EdgeResponse) -> Result<()>;

    async fn remove(&self, store: &str, key: &str) -> Result<bool>;

    /// Snapshot of a store's entries; empty for unknown stores.
    async fn entries(&self, store: &str) -> Result<Vec<(String, EdgeResponse)>>;
}

// == Memory Storage ==
/// In-memory [`StoreBackend`].
#[derive(Debug, Default)]
pub struct MemoryStorage {
    stores: RwLock<HashMap<String, HashMap<String, EdgeResponse>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl StoreBackend for MemoryStorage {
    async fn store_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.stores.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn open(&self, store: &str) -> Result<()> {
        self.stores
            .write()
            .await
            .entry(store.to_string())
            .or_default();
        Ok(())
    }

    async fn delete_store(&self, store: &str) -> Result<bool> {
        Ok(self.stores.write().await.remove(store).is_some())
    }

    async fn lookup(&self, store: &str, key: &str) -> Result<Option<EdgeResponse>> {
        Ok(self
            .stores
            .read()
            .await
            .get(store)
            .and_then(|entries| entries.get(key))
            .cloned())
    }

    async fn put(&self, store: &str, key: &str, response: EdgeResponse) -> Result<()> {
        self.stores
            .write()
            .await
            .entry(store.to_string())
            .or_default()
            .insert(key.to_string(), response);
        Ok(())
    }

    async fn remove(&self, store: &str, key: &str) -> Result<bool> {
        Ok(self
            .stores
            .write()
            .await
            .get_mut(store)
            .is_some_and(|entries| entries.remove(key).is_some()))
    }

    async fn entries(&self, store: &str) -> Result<Vec<(String, EdgeResponse)>> {
        Ok(self
            .stores
            .read()
            .await
            .get(store)
            .map(|entries| {
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}
