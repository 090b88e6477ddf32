//! HTTP handlers for activity-service.
//!
//! The activity and message endpoints play the part of the chat framework:
//! they feed notifications and chat text into the plugin and return what it
//! emits.

pub mod activity;
pub mod health;
pub mod messages;

pub use activity::publish_activity;
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use messages::receive_message;
