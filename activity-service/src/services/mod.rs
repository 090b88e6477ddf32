pub mod client_provider;
pub mod commands;
pub mod consumer;
pub mod messages;
pub mod metrics;
pub mod report;
pub mod store;

pub use client_provider::StoreClientProvider;
pub use commands::CommandRouter;
pub use consumer::{ActivityConsumer, ConsumerError};
pub use messages::MessageCatalog;
pub use self::metrics::{get_metrics, init_metrics, record_activity_write, record_report};
pub use report::{ReportError, ReportGenerator};
pub use store::{
    ElasticsearchStore, IndexResponse, StoreError, UsageStore, USAGE_DOC_TYPE, USAGE_INDEX_NAME,
};
