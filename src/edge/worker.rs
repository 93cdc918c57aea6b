//! Edge interception cache lifecycle: install, activate, intercept, clean up.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::EdgeConfig;
use crate::edge::{
    EdgeRequest, EdgeResponse, MemoryStorage, Network, StoreBackend, StoreNames, Strategy,
};
use crate::error::{CacheError, Result};

/// Where the cache is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Constructed, nothing pre-populated
    Idle,
    /// Manifest warmed
    Installed,
    /// Stale generations purged, controlling all clients
    Active,
}

/// Outcome of [`EdgeCache::install`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InstallReport {
    pub static_cached: usize,
    pub api_cached: usize,
    /// URLs that could not be pre-populated
    pub failed: Vec<String>,
}

/// Outcome of one [`EdgeCache::cleanup`] pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanupReport {
    pub scanned: usize,
    pub removed: usize,
    /// Entries kept because their age could not be determined
    pub undatable: usize,
}

// == Edge Cache ==
/// Network-boundary cache answering intercepted GETs from three named
/// stores, chosen by request class.
pub struct EdgeCache {
    config: EdgeConfig,
    names: StoreNames,
    pub(crate) storage: Arc<dyn StoreBackend>,
    pub(crate) network: Arc<dyn Network>,
    state: RwLock<LifecycleState>,
    cleaning: AtomicBool,
}

impl EdgeCache {
    pub fn new(config: EdgeConfig, storage: Arc<dyn StoreBackend>, network: Arc<dyn Network>) -> Self {
        let names = StoreNames::for_version(&config.version);
        Self {
            config,
            names,
            storage,
            network,
            state: RwLock::new(LifecycleState::Idle),
            cleaning: AtomicBool::new(false),
        }
    }

    /// Cache over fresh in-memory stores.
    pub fn in_memory(config: EdgeConfig, network: Arc<dyn Network>) -> Self {
        Self::new(config, Arc::new(MemoryStorage::new()), network)
    }

    pub fn names(&self) -> &StoreNames {
        &self.names
    }

    pub fn config(&self) -> &EdgeConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn StoreBackend> {
        &self.storage
    }

    pub async fn state(&self) -> LifecycleState {
        *self.state.read().await
    }

    // == Install ==
    /// Warms the static store from the manifest and the API store from the
    /// API endpoint list. Individual failures are logged and reported,
    /// never fatal.
    pub async fn install(&self) -> InstallReport {
        info!(generation = %self.names.umbrella, "installing edge cache");
        let mut report = InstallReport::default();

        for store in self.names.recognized() {
            if let Err(err) = self.storage.open(store).await {
                warn!(store, error = %err, "could not open store");
            }
        }

        for url in &self.config.static_manifest {
            match self.warm(&self.names.static_store, url).await {
                Ok(()) => report.static_cached += 1,
                Err(err) => {
                    warn!(url = %url, error = %err, "failed to pre-cache static resource");
                    report.failed.push(url.clone());
                }
            }
        }

        for url in &self.config.api_manifest {
            match self.warm(&self.names.api_store, url).await {
                Ok(()) => report.api_cached += 1,
                Err(err) => {
                    warn!(url = %url, error = %err, "failed to pre-cache API endpoint");
                    report.failed.push(url.clone());
                }
            }
        }

        *self.state.write().await = LifecycleState::Installed;
        info!(
            static_cached = report.static_cached,
            api_cached = report.api_cached,
            failed = report.failed.len(),
            "edge cache installed"
        );
        report
    }

    async fn warm(&self, store: &str, url: &str) -> Result<()> {
        let request = EdgeRequest::resolve(&self.config.origin, url)?;
        let response = self.network.fetch(&request).await?;
        if !response.is_success() {
            return Err(CacheError::Network(format!("{} returned {}", url, response.status)));
        }
        self.storage
            .put(store, &request.cache_key(), response.for_storage(Utc::now()))
            .await
    }

    // == Activate ==
    /// Deletes every store outside the current generation, then takes
    /// control of open clients. Returns the deleted store names.
    pub async fn activate(&self) -> Result<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.storage.store_names().await? {
            if !self.names.is_recognized(&name) {
                self.storage.delete_store(&name).await?;
                info!(store = %name, "deleted store from previous generation");
                deleted.push(name);
            }
        }

        *self.state.write().await = LifecycleState::Active;
        info!(generation = %self.names.umbrella, "edge cache active, controlling clients");
        Ok(deleted)
    }

    // == Intercept ==
    /// Answers one outgoing request.
    ///
    /// Non-GET and non-http(s) requests go straight to the network. A
    /// cache-side failure falls back to an uncached network fetch; only
    /// network failures the strategy cannot cover reach the caller.
    pub async fn handle(&self, request: &EdgeRequest) -> Result<EdgeResponse> {
        if !request.is_interceptable() {
            return self.network.fetch(request).await;
        }

        let class = request.class();
        let store = self.names.for_role(class.role());
        let outcome = match class.strategy() {
            Strategy::CacheFirst => self.cache_first(store, request).await,
            Strategy::NetworkFirst => self.network_first(store, request).await,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(store, request).await,
        };

        match outcome {
            Ok(response) => Ok(response),
            Err(err @ CacheError::Network(_)) => Err(err),
            Err(err) => {
                warn!(uri = %request.uri, error = %err, "edge cache failed, fetching directly");
                self.network.fetch(request).await
            }
        }
    }

    // == Cleanup ==
    /// Deletes stored responses older than the configured max age.
    ///
    /// Returns `None` if another cleanup is still running.
    pub async fn cleanup(&self) -> Option<CleanupReport> {
        self.cleanup_at(Utc::now()).await
    }

    pub async fn cleanup_at(&self, now: DateTime<Utc>) -> Option<CleanupReport> {
        if self
            .cleaning
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("edge cleanup already running, skipping");
            return None;
        }
        let _running = CleaningGuard(&self.cleaning);

        let max_age = chrono::Duration::from_std(self.config.max_age)
            .unwrap_or_else(|_| chrono::Duration::days(7));
        let mut report = CleanupReport::default();

        let stores = match self.storage.store_names().await {
            Ok(stores) => stores,
            Err(err) => {
                warn!(error = %err, "edge cleanup could not list stores");
                return Some(report);
            }
        };

        for store in stores {
            let entries = match self.storage.entries(&store).await {
                Ok(entries) => entries,
                Err(err) => {
                    warn!(store = %store, error = %err, "edge cleanup could not read store");
                    continue;
                }
            };

            for (key, response) in entries {
                report.scanned += 1;
                let Some(date) = response.date() else {
                    report.undatable += 1;
                    continue;
                };
                if now - date > max_age {
                    match self.storage.remove(&store, &key).await {
                        Ok(true) => report.removed += 1,
                        Ok(false) => {}
                        Err(err) => warn!(store = %store, key = %key, error = %err, "could not remove entry"),
                    }
                }
            }
        }

        info!(
            scanned = report.scanned,
            removed = report.removed,
            undatable = report.undatable,
            "edge cleanup finished"
        );
        Some(report)
    }
}

/// Clears the running flag even if cleanup unwinds.
struct CleaningGuard<'a>(&'a AtomicBool);

impl Drop for CleaningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
