//! User-facing strings, keyed by message id.
//!
//! Activity ids double as message ids: an activity is only reportable when
//! the catalog knows how to name it.

use std::collections::HashMap;

const ENGLISH: &str = include_str!("../../messages/en.json");

#[derive(Debug, Clone)]
pub struct MessageCatalog {
    messages: HashMap<String, String>,
}

impl MessageCatalog {
    /// Catalog bundled with the service.
    pub fn english() -> Result<Self, serde_json::Error> {
        Self::from_json(ENGLISH)
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let messages: HashMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self { messages })
    }

    pub fn translate(&self, key: &str) -> Option<&str> {
        self.messages.get(key).map(String::as_str)
    }

    /// Message for `key`, or the key itself when unknown.
    pub fn text(&self, key: &str) -> String {
        self.translate(key).unwrap_or(key).to_string()
    }

    /// Message for `key` with each `{name}` placeholder replaced.
    pub fn format(&self, key: &str, args: &[(&str, &str)]) -> String {
        args.iter()
            .fold(self.text(key), |message, (name, value)| {
                message.replace(&format!("{{{}}}", name), value)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_catalog_parses_and_knows_report_strings() {
        let catalog = MessageCatalog::english().unwrap();
        for key in [
            "usage.info.unavailable",
            "usage.not.supported",
            "usage.done.nothing",
            "usage.summary.day",
            "usage.summary.week",
            "usage.performed.activity.once",
            "usage.performed.activity.multiple",
            "help.activity.day",
            "help.activity.week",
            "activity.app.start",
        ] {
            assert!(catalog.translate(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn unknown_key_falls_back_to_key() {
        let catalog = MessageCatalog::english().unwrap();
        assert_eq!(catalog.translate("activity.unknown"), None);
        assert_eq!(catalog.text("activity.unknown"), "activity.unknown");
    }

    #[test]
    fn placeholders_are_substituted() {
        let catalog =
            MessageCatalog::from_json(r#"{"greet": "{who} did {what} {who}"}"#).unwrap();
        assert_eq!(
            catalog.format("greet", &[("who", "bot"), ("what", "work")]),
            "bot did work bot"
        );
    }
}
