//! Contract between the plugin and the chat framework hosting it.
//!
//! The plugin never reaches for a global event bus: it is handed a
//! [`BotHost`] and registers on it. [`HttpHost`] is the implementation used
//! when the plugin runs as a standalone service.

use crate::models::{ActivityEvent, FormattedOutput};
use std::sync::{Arc, Mutex, RwLock};

/// Called once per activity notification. Must not block.
pub type ActivityHandler = Arc<dyn Fn(ActivityEvent) + Send + Sync>;

/// Adapters that render attachments as charts.
const CHART_CAPABLE_ADAPTERS: &[&str] = &["slack", "facebook"];

pub trait BotHost: Send + Sync {
    /// Name the bot answers to.
    fn name(&self) -> &str;

    fn adapter_name(&self) -> Option<&str>;

    fn supports_charts(&self) -> bool;

    /// Register `handler` for every future activity notification.
    fn on_activity(&self, handler: ActivityHandler);

    /// Deliver `output` as a reply within `conversation`.
    fn emit(&self, conversation: &Conversation, output: FormattedOutput);
}

/// The incoming chat message a command is answering, plus its replies.
#[derive(Debug)]
pub struct Conversation {
    pub user: String,
    pub text: String,
    replies: Mutex<Vec<FormattedOutput>>,
}

impl Conversation {
    pub fn new(user: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            text: text.into(),
            replies: Mutex::new(Vec::new()),
        }
    }

    pub fn push_reply(&self, output: FormattedOutput) {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(output);
    }

    pub fn replies(&self) -> Vec<FormattedOutput> {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

pub fn is_chart_capable(adapter: Option<&str>) -> bool {
    adapter
        .map(|a| {
            CHART_CAPABLE_ADAPTERS
                .iter()
                .any(|capable| a.eq_ignore_ascii_case(capable))
        })
        .unwrap_or(false)
}

/// Host backing the HTTP surface: activity handlers are invoked inline on
/// publish, replies are collected on the conversation.
pub struct HttpHost {
    name: String,
    adapter: Option<String>,
    handlers: RwLock<Vec<ActivityHandler>>,
}

impl HttpHost {
    pub fn new(name: impl Into<String>, adapter: Option<String>) -> Self {
        Self {
            name: name.into(),
            adapter,
            handlers: RwLock::new(Vec::new()),
        }
    }

    /// Fan `event` out to every registered handler. Returns how many ran.
    pub fn publish(&self, event: &ActivityEvent) -> usize {
        let handlers = self
            .handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();

        for handler in &handlers {
            handler(event.clone());
        }

        handlers.len()
    }

    pub fn handler_count(&self) -> usize {
        self.handlers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

impl BotHost for HttpHost {
    fn name(&self) -> &str {
        &self.name
    }

    fn adapter_name(&self) -> Option<&str> {
        self.adapter.as_deref()
    }

    fn supports_charts(&self) -> bool {
        is_chart_capable(self.adapter.as_deref())
    }

    fn on_activity(&self, handler: ActivityHandler) {
        self.handlers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(handler);
    }

    fn emit(&self, conversation: &Conversation, output: FormattedOutput) {
        let output = match output {
            FormattedOutput::Message(text) => {
                FormattedOutput::Message(format!("@{} {}", conversation.user, text))
            }
            attachments => attachments,
        };
        tracing::debug!(user = %conversation.user, "Emitting reply");
        conversation.push_reply(output);
    }
}
