pub mod elasticsearch;
#[cfg(test)]
pub mod mock;

use crate::models::UsageDocument;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use elasticsearch::ElasticsearchStore;
#[cfg(test)]
pub use mock::{aggregation_response, MockUsageStore};

/// Index holding one document per bot activity.
pub const USAGE_INDEX_NAME: &str = "hubotusage";
/// Mapping type the usage documents are written under.
pub const USAGE_DOC_TYPE: &str = "UsageEntry";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Store returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode store response: {0}")]
    Decode(String),

    #[error("Failed to build store client: {0}")]
    Build(String),
}

/// Acknowledgement for a single-document insert.
///
/// Older stores answer `{"created": true}`, newer ones `{"result": "created"}`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct IndexResponse {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<String>,
}

impl IndexResponse {
    pub fn created() -> Self {
        Self {
            id: None,
            created: Some(true),
            result: Some("created".to_string()),
        }
    }

    pub fn is_created(&self) -> bool {
        self.created == Some(true) || self.result.as_deref() == Some("created")
    }
}

/// The slice of the document store the plugin depends on.
#[async_trait]
pub trait UsageStore: Send + Sync {
    /// Append one document to `index` under `doc_type`.
    async fn index(
        &self,
        index: &str,
        doc_type: &str,
        document: &UsageDocument,
    ) -> Result<IndexResponse, StoreError>;

    /// Run a search and hand back the raw response body; shape checks are
    /// the caller's concern.
    async fn search(
        &self,
        index: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn legacy_and_current_index_acks_count_as_created() {
        let legacy: IndexResponse =
            serde_json::from_value(json!({"_id": "a", "created": true})).unwrap();
        let current: IndexResponse =
            serde_json::from_value(json!({"_id": "b", "result": "created"})).unwrap();
        let updated: IndexResponse =
            serde_json::from_value(json!({"_id": "c", "result": "updated"})).unwrap();
        let refused: IndexResponse = serde_json::from_value(json!({"created": false})).unwrap();

        assert!(legacy.is_created());
        assert!(current.is_created());
        assert!(!updated.is_created());
        assert!(!refused.is_created());
        assert!(!IndexResponse::default().is_created());
    }
}
