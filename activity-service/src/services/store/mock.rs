use super::{IndexResponse, StoreError, UsageStore};
use crate::models::UsageDocument;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// In-memory store for unit tests.
///
/// Records every indexed document and search body, answers searches with a
/// canned response.
pub struct MockUsageStore {
    index_response: Mutex<Result<IndexResponse, String>>,
    search_response: Mutex<Result<serde_json::Value, String>>,
    documents: Mutex<Vec<UsageDocument>>,
    searches: Mutex<Vec<serde_json::Value>>,
    index_count: AtomicU64,
    search_count: AtomicU64,
}

impl MockUsageStore {
    pub fn new() -> Self {
        Self {
            index_response: Mutex::new(Ok(IndexResponse::created())),
            search_response: Mutex::new(Ok(aggregation_response(&[]))),
            documents: Mutex::new(Vec::new()),
            searches: Mutex::new(Vec::new()),
            index_count: AtomicU64::new(0),
            search_count: AtomicU64::new(0),
        }
    }

    /// Answer searches with an aggregation over these `(activity_id, count)` pairs.
    pub fn with_buckets(self, buckets: &[(&str, u64)]) -> Self {
        self.set_search_response(aggregation_response(buckets));
        self
    }

    pub fn set_search_response(&self, response: serde_json::Value) {
        *lock(&self.search_response) = Ok(response);
    }

    pub fn fail_searches(&self, message: &str) {
        *lock(&self.search_response) = Err(message.to_string());
    }

    pub fn set_index_response(&self, response: IndexResponse) {
        *lock(&self.index_response) = Ok(response);
    }

    pub fn fail_writes(&self, message: &str) {
        *lock(&self.index_response) = Err(message.to_string());
    }

    pub fn documents(&self) -> Vec<UsageDocument> {
        lock(&self.documents).clone()
    }

    pub fn searches(&self) -> Vec<serde_json::Value> {
        lock(&self.searches).clone()
    }

    pub fn index_count(&self) -> u64 {
        self.index_count.load(Ordering::SeqCst)
    }

    pub fn search_count(&self) -> u64 {
        self.search_count.load(Ordering::SeqCst)
    }
}

impl Default for MockUsageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UsageStore for MockUsageStore {
    async fn index(
        &self,
        index: &str,
        doc_type: &str,
        document: &UsageDocument,
    ) -> Result<IndexResponse, StoreError> {
        self.index_count.fetch_add(1, Ordering::SeqCst);

        tracing::info!(
            index = %index,
            doc_type = %doc_type,
            activity_id = %document.activity_id,
            "[MOCK] Usage document would be indexed"
        );

        let response = lock(&self.index_response).clone();
        match response {
            Ok(ack) => {
                lock(&self.documents).push(document.clone());
                Ok(ack)
            }
            Err(message) => Err(StoreError::Connection(message)),
        }
    }

    async fn search(
        &self,
        _index: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, StoreError> {
        self.search_count.fetch_add(1, Ordering::SeqCst);
        lock(&self.searches).push(body.clone());

        lock(&self.search_response)
            .clone()
            .map_err(StoreError::Connection)
    }
}

/// Search response shaped like an Elasticsearch terms aggregation named `bot_activity`.
pub fn aggregation_response(buckets: &[(&str, u64)]) -> serde_json::Value {
    let buckets: Vec<serde_json::Value> = buckets
        .iter()
        .map(|(key, count)| serde_json::json!({ "key": key, "doc_count": count }))
        .collect();

    serde_json::json!({
        "hits": { "total": buckets.len(), "hits": [] },
        "aggregations": {
            "bot_activity": {
                "doc_count_error_upper_bound": 0,
                "sum_other_doc_count": 0,
                "buckets": buckets
            }
        }
    })
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
