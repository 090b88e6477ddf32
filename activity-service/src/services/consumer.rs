//! Captures bot activity notifications and stores them as usage documents.
//!
//! Writes are detached from the notification path: a slow or unavailable
//! store only ever shows up in the logs, never to whoever emitted the
//! activity.

use super::client_provider::StoreClientProvider;
use super::metrics::record_activity_write;
use super::store::{UsageStore, USAGE_DOC_TYPE, USAGE_INDEX_NAME};
use crate::config::AuditConfig;
use crate::host::BotHost;
use crate::models::{ActivityEvent, UsageDocument};
use chrono::Utc;
use std::sync::{Arc, RwLock};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error(
        "Auditing is disabled. To enable auditing, ensure HUBOT_AUDIT_ENDPOINT is defined and HUBOT_BLUEMIX_AUDIT_DISABLED is not set to true"
    )]
    AuditingDisabled,
}

pub struct ActivityConsumer {
    provider: Arc<StoreClientProvider>,
    container_uuid: String,
    audit_disabled: bool,
    /// Set once `init` succeeds.
    client: RwLock<Option<Arc<dyn UsageStore>>>,
}

impl ActivityConsumer {
    pub fn new(config: &AuditConfig, provider: Arc<StoreClientProvider>) -> Self {
        Self {
            provider,
            container_uuid: config.container_uuid.clone(),
            audit_disabled: config.disabled,
            client: RwLock::new(None),
        }
    }

    /// Identifier of the instance running this bot.
    pub fn container_uuid(&self) -> &str {
        &self.container_uuid
    }

    /// Store handle for activity searches; `None` until `init` succeeds.
    pub fn client(&self) -> Option<Arc<dyn UsageStore>> {
        self.client
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn is_active(&self) -> bool {
        self.client().is_some()
    }

    /// Start listening for activity on `host`.
    ///
    /// Fails when auditing is switched off or no store endpoint is
    /// configured. Calling it again after success registers another handler.
    pub fn init(
        self: &Arc<Self>,
        host: Arc<dyn BotHost>,
    ) -> Result<Arc<dyn UsageStore>, ConsumerError> {
        let store = if self.audit_disabled {
            None
        } else {
            self.provider.get_client()
        };

        let Some(store) = store else {
            tracing::warn!("{}", ConsumerError::AuditingDisabled);
            return Err(ConsumerError::AuditingDisabled);
        };

        // Set before registering so the first activity already finds a client.
        *self
            .client
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(store.clone());

        let consumer = Arc::clone(self);
        let weak_host = Arc::downgrade(&host);
        host.on_activity(Arc::new(move |event: ActivityEvent| {
            let Some(host) = weak_host.upgrade() else {
                return;
            };
            let consumer = consumer.clone();

            match tokio::runtime::Handle::try_current() {
                Ok(runtime) => {
                    runtime.spawn(async move {
                        consumer.create_activity_doc(host.as_ref(), &event).await;
                    });
                }
                Err(_) => tracing::error!(
                    activity_id = %event.activity_id,
                    "No async runtime available, dropping bot activity"
                ),
            }
        }));

        tracing::info!(
            container_uuid = %self.container_uuid,
            "Bot activity auditing enabled"
        );
        Ok(store)
    }

    /// Gate run before each incoming chat message: initializes on first use
    /// and lets the message through either way.
    pub fn ensure_initialized(self: &Arc<Self>, host: Arc<dyn BotHost>) -> bool {
        if self.is_active() {
            return true;
        }

        match self.init(host) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!(error = %e, "Continuing without bot activity auditing");
                false
            }
        }
    }

    /// Persist one activity. Failures are logged and swallowed.
    pub async fn create_activity_doc(&self, host: &dyn BotHost, event: &ActivityEvent) {
        let Some(client) = self.client() else {
            return;
        };

        let document = UsageDocument::from_event(
            event,
            &self.container_uuid,
            host.adapter_name(),
            Utc::now().timestamp_millis(),
        );

        match client
            .index(USAGE_INDEX_NAME, USAGE_DOC_TYPE, &document)
            .await
        {
            Ok(result) if result.is_created() => {
                tracing::debug!(
                    activity_id = %document.activity_id,
                    id = ?result.id,
                    "Stored usage doc"
                );
                record_activity_write(&document.activity_id, "created");
            }
            Ok(result) => {
                tracing::error!(
                    activity_id = %document.activity_id,
                    result = ?result,
                    "Unexpected response while inserting usage doc into Elasticsearch"
                );
                record_activity_write(&document.activity_id, "unexpected");
            }
            Err(e) => {
                tracing::error!(
                    activity_id = %document.activity_id,
                    error = %e,
                    "Error inserting usage doc into Elasticsearch"
                );
                record_activity_write(&document.activity_id, "failed");
            }
        }
    }
}
