use serde::{Deserialize, Serialize};

/// Rich card rendered by chart-capable chat adapters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Attachment {
    pub title: String,
    pub text: String,
    pub title_link: String,
    pub image_url: String,
}

/// What the plugin hands back to the host for delivery.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum FormattedOutput {
    Message(String),
    Attachments(Vec<Attachment>),
}
