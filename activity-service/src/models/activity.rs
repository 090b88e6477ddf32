use serde::{Deserialize, Serialize};
use validator::Validate;

/// Notification that some tracked bot action happened.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct ActivityEvent {
    #[validate(length(min = 1, message = "activity_id cannot be empty"))]
    pub activity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

impl ActivityEvent {
    pub fn new(activity_id: impl Into<String>) -> Self {
        Self {
            activity_id: activity_id.into(),
            app_name: None,
            app_guid: None,
            space_guid: None,
            space_name: None,
            event_type: None,
        }
    }
}

/// One persisted activity record. Never updated once written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UsageDocument {
    pub container_uuid: String,
    /// Epoch milliseconds at write time.
    pub timestamp: i64,
    pub activity_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub adapter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_guid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub space_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,
}

impl UsageDocument {
    /// Builds the document for `event`. Empty optional attributes are dropped
    /// the same way missing ones are.
    pub fn from_event(
        event: &ActivityEvent,
        container_uuid: &str,
        adapter_name: Option<&str>,
        timestamp: i64,
    ) -> Self {
        Self {
            container_uuid: container_uuid.to_string(),
            timestamp,
            activity_id: event.activity_id.clone(),
            adapter_name: adapter_name
                .filter(|a| !a.is_empty())
                .map(|a| a.to_lowercase()),
            app_name: present(&event.app_name),
            app_guid: present(&event.app_guid),
            space_guid: present(&event.space_guid),
            space_name: present(&event.space_name),
            event_type: present(&event.event_type),
        }
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    Today,
    ThisWeek,
}

impl Timeframe {
    /// Accepts any phrasing containing `today` or `week`.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.contains("today") {
            Some(Timeframe::Today)
        } else if raw.contains("week") {
            Some(Timeframe::ThisWeek)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::Today => "today",
            Timeframe::ThisWeek => "this week",
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Count of documents sharing one `activity_id` inside the report window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivityBucket {
    pub key: String,
    pub doc_count: u64,
}
