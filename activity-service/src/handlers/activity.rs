use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use validator::Validate;

use crate::models::ActivityEvent;
use crate::startup::AppState;
use service_core::error::AppError;

#[derive(Debug, Serialize)]
pub struct PublishActivityResponse {
    pub activity_id: String,
    /// Handlers the activity was delivered to; 0 while auditing is off.
    pub listeners: usize,
}

/// Announce a bot activity. Persistence happens in the background, so the
/// response never reflects whether the document was written.
#[tracing::instrument(skip(state, event))]
pub async fn publish_activity(
    State(state): State<AppState>,
    Json(event): Json<ActivityEvent>,
) -> Result<(StatusCode, Json<PublishActivityResponse>), AppError> {
    event.validate()?;

    let listeners = state.host.publish(&event);
    tracing::debug!(
        activity_id = %event.activity_id,
        listeners = listeners,
        "Bot activity published"
    );

    Ok((
        StatusCode::ACCEPTED,
        Json(PublishActivityResponse {
            activity_id: event.activity_id,
            listeners,
        }),
    ))
}
