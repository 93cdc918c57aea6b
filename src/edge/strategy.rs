//! Cache-first, network-first and stale-while-revalidate.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::edge::{EdgeCache, EdgeRequest, EdgeResponse, Network, StoreBackend};
use crate::error::Result;

impl EdgeCache {
    /// Stored copy if present, else the network; successful network
    /// responses are stored. Fails only when both are unavailable.
    pub(crate) async fn cache_first(&self, store: &str, request: &EdgeRequest) -> Result<EdgeResponse> {
        let key = request.cache_key();
        if let Some(stored) = self.storage.lookup(store, &key).await? {
            debug!(store, key = %key, "cache-first hit");
            return Ok(stored);
        }

        let response = self.network.fetch(request).await?;
        if response.is_success() {
            put_quietly(self.storage.as_ref(), store, &key, &response).await;
        }
        Ok(response)
    }

    /// The network if reachable (storing successes), else the stored copy.
    pub(crate) async fn network_first(&self, store: &str, request: &EdgeRequest) -> Result<EdgeResponse> {
        let key = request.cache_key();
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_success() {
                    put_quietly(self.storage.as_ref(), store, &key, &response).await;
                }
                Ok(response)
            }
            Err(network_err) => match self.storage.lookup(store, &key).await {
                Ok(Some(stored)) => {
                    debug!(store, key = %key, error = %network_err, "network-first served stored copy");
                    Ok(stored)
                }
                Ok(None) => Err(network_err),
                Err(storage_err) => {
                    warn!(store, key = %key, error = %storage_err, "stored fallback unavailable");
                    Err(network_err)
                }
            },
        }
    }

    /// The stored copy immediately, refreshed by a detached fetch; waits on
    /// the network only when nothing is stored.
    pub(crate) async fn stale_while_revalidate(
        &self,
        store: &str,
        request: &EdgeRequest,
    ) -> Result<EdgeResponse> {
        let key = request.cache_key();
        let stored = self.storage.lookup(store, &key).await?;

        let Some(stored) = stored else {
            let response = self.network.fetch(request).await?;
            if response.is_success() {
                put_quietly(self.storage.as_ref(), store, &key, &response).await;
            }
            return Ok(response);
        };

        let storage = Arc::clone(&self.storage);
        let network = Arc::clone(&self.network);
        let request = request.clone();
        let store = store.to_string();
        tokio::spawn(async move {
            revalidate(storage, network, store, key, request).await;
        });

        Ok(stored)
    }
}

async fn revalidate(
    storage: Arc<dyn StoreBackend>,
    network: Arc<dyn Network>,
    store: String,
    key: String,
    request: EdgeRequest,
) {
    match network.fetch(&request).await {
        Ok(response) if response.is_success() => {
            put_quietly(storage.as_ref(), &store, &key, &response).await;
            debug!(store = %store, key = %key, "revalidated stored response");
        }
        Ok(response) => {
            debug!(store = %store, key = %key, status = %response.status, "revalidation kept stored copy");
        }
        Err(err) => {
            warn!(store = %store, key = %key, error = %err, "background revalidation failed");
        }
    }
}

/// Stores a clone of `response`; a storage failure never fails the request.
async fn put_quietly(storage: &dyn StoreBackend, store: &str, key: &str, response: &EdgeResponse) {
    let copy = response.for_storage(Utc::now());
    if let Err(err) = storage.put(store, key, copy).await {
        warn!(store, key, error = %err, "failed to store response");
    }
}
