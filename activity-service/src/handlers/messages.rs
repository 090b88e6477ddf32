use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::host::{BotHost, Conversation};
use crate::models::FormattedOutput;
use crate::startup::AppState;
use service_core::error::AppError;

#[derive(Debug, Deserialize, Validate)]
pub struct ChatMessageRequest {
    #[validate(length(min = 1, message = "user cannot be empty"))]
    pub user: String,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub handled: bool,
    pub replies: Vec<FormattedOutput>,
}

/// Deliver one chat message to the plugin's commands.
#[tracing::instrument(skip(state, request))]
pub async fn receive_message(
    State(state): State<AppState>,
    Json(request): Json<ChatMessageRequest>,
) -> Result<Json<ChatMessageResponse>, AppError> {
    request.validate()?;

    let host: Arc<dyn BotHost> = state.host.clone();
    state.consumer.ensure_initialized(host.clone());

    let conversation = Conversation::new(request.user, request.text);
    let handled = state.commands.dispatch(host.as_ref(), &conversation).await;

    Ok(Json(ChatMessageResponse {
        handled,
        replies: conversation.replies(),
    }))
}
