//! Elasticsearch REST client for usage documents.
//!
//! Only the two calls the plugin needs are implemented: a single-document
//! insert and a search. Connection pooling and timeouts are delegated to
//! reqwest.

use super::{IndexResponse, StoreError, UsageStore};
use crate::models::UsageDocument;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Idle connections kept per host.
pub const MAX_SOCKETS: usize = 1000;
/// Applies to every request, connect included.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct ElasticsearchStore {
    client: Client,
    base_url: String,
}

impl ElasticsearchStore {
    pub fn new(endpoint: &str) -> Result<Self, StoreError> {
        let client = Client::builder()
            .pool_max_idle_per_host(MAX_SOCKETS)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| StoreError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base_url: endpoint.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post_json<B: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, StoreError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                StoreError::Connection(format!("Failed to reach Elasticsearch at {}: {}", url, e))
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Status { status, body });
        }

        Ok(response)
    }
}

#[async_trait]
impl UsageStore for ElasticsearchStore {
    async fn index(
        &self,
        index: &str,
        doc_type: &str,
        document: &UsageDocument,
    ) -> Result<IndexResponse, StoreError> {
        let url = format!("{}/{}/{}", self.base_url, index, doc_type);
        let response = self.post_json(&url, document).await?;

        response
            .json::<IndexResponse>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn search(
        &self,
        index: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, StoreError> {
        let url = format!("{}/{}/_search", self.base_url, index);
        tracing::debug!(url = %url, "Searching usage index");
        let response = self.post_json(&url, body).await?;

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }
}
