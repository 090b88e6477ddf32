//! Owns the lazily built store client.
//!
//! The handle is created on first use from the configured endpoint and kept
//! until [`StoreClientProvider::clear_client`] drops it. Without an endpoint
//! every lookup warns and yields `None`.

use super::store::{ElasticsearchStore, UsageStore};
use std::sync::{Arc, RwLock};

pub struct StoreClientProvider {
    endpoint: Option<String>,
    client: RwLock<Option<Arc<dyn UsageStore>>>,
}

impl StoreClientProvider {
    pub fn new(endpoint: Option<String>) -> Self {
        Self {
            endpoint,
            client: RwLock::new(None),
        }
    }

    /// Provider whose memo is already filled with `store`.
    pub fn with_store(endpoint: Option<String>, store: Arc<dyn UsageStore>) -> Self {
        Self {
            endpoint,
            client: RwLock::new(Some(store)),
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn get_client(&self) -> Option<Arc<dyn UsageStore>> {
        if let Some(client) = self
            .client
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .as_ref()
        {
            return Some(client.clone());
        }

        let Some(endpoint) = self.endpoint.as_deref() else {
            tracing::warn!(
                "Unable to capture usage information because HUBOT_AUDIT_ENDPOINT environment variable is not set."
            );
            return None;
        };

        let mut slot = self
            .client
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // Another caller may have built it while we waited for the write lock.
        if let Some(client) = slot.as_ref() {
            return Some(client.clone());
        }

        match ElasticsearchStore::new(endpoint) {
            Ok(store) => {
                tracing::info!(endpoint = %endpoint, "Created Elasticsearch client for usage tracking");
                let client: Arc<dyn UsageStore> = Arc::new(store);
                *slot = Some(client.clone());
                Some(client)
            }
            Err(e) => {
                tracing::error!(endpoint = %endpoint, error = %e, "Failed to create Elasticsearch client");
                None
            }
        }
    }

    pub fn clear_client(&self) {
        *self
            .client
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }
}
