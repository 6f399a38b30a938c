use axum::{extract::State, Json};
use serde::Serialize;
use tracing::instrument;

use super::{transcript, ChatDraft, ChatEntry, ChatExchange, ChatFilter, ChatMessage};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, AppJson, AppQuery},
    response::{ApiList, ApiSuccess},
    scoping::Scoped,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cleared {
    pub success: bool,
    pub message: &'static str,
    pub cleared_count: u64,
}

#[instrument(skip(scope, filter))]
pub async fn history(
    State(scope): State<Scoped<ChatEntry>>,
    AuthUser(user_id): AuthUser,
    AppQuery(filter): AppQuery<ChatFilter>,
) -> Result<ApiList<ChatMessage>, ApiError> {
    let entries = scope.list(user_id, &filter).await?;
    Ok(ApiList::new(transcript(&entries)))
}

#[instrument(skip(scope, draft))]
pub async fn send(
    State(scope): State<Scoped<ChatEntry>>,
    AuthUser(user_id): AuthUser,
    AppJson(draft): AppJson<ChatDraft>,
) -> Result<ApiSuccess<ChatExchange>, ApiError> {
    let entry = scope.create(user_id, draft).await?;
    Ok(ApiSuccess::ok(entry.exchange()).with_message("Message processed successfully"))
}

#[instrument(skip(scope))]
pub async fn clear(
    State(scope): State<Scoped<ChatEntry>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Cleared>, ApiError> {
    let cleared_count = scope.clear(user_id).await?;
    Ok(Json(Cleared {
        success: true,
        message: "Chat history cleared successfully",
        cleared_count,
    }))
}
