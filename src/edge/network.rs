//! Network access for the edge tier.

use async_trait::async_trait;
use tracing::debug;

use crate::edge::{EdgeRequest, EdgeResponse};
use crate::error::Result;

/// Performs real network fetches.
///
/// A response with any status is `Ok`; `Err` means the fetch itself failed
/// (connection refused, offline, timeout).
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &EdgeRequest) -> Result<EdgeResponse>;
}

/// [`Network`] backed by a `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpNetwork {
    client: reqwest::Client,
}

impl HttpNetwork {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &EdgeRequest) -> Result<EdgeResponse> {
        debug!(method = %request.method, uri = %request.uri, "network fetch");

        let response = self
            .client
            .request(request.method.clone(), request.uri.to_string())
            .headers(request.headers.clone())
            .send()
            .await?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?;

        Ok(EdgeResponse {
            status,
            headers,
            body,
        })
    }
}
