use axum::{
    extract::State,
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, AppJson},
    response::ApiSuccess,
    state::AppState,
    users::Settings,
};

#[derive(Debug, Deserialize)]
pub struct SettingsRequest {
    /// Absent fields are reset to their defaults.
    #[serde(default)]
    pub settings: Settings,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DarkModeRequest {
    pub dark_mode: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DarkModeResponse {
    pub dark_mode: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(read).put(replace))
        .route("/dark-mode", put(dark_mode))
}

#[instrument(skip(state))]
async fn read(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiSuccess<Settings>, ApiError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(ApiSuccess::ok(user.settings))
}

#[instrument(skip(state, body))]
async fn replace(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(body): AppJson<SettingsRequest>,
) -> Result<ApiSuccess<Settings>, ApiError> {
    let saved = state
        .users
        .replace_settings(user_id, &body.settings)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(%user_id, "settings replaced");
    Ok(ApiSuccess::ok(saved).with_message("Settings updated successfully"))
}

#[instrument(skip(state, body))]
async fn dark_mode(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(body): AppJson<DarkModeRequest>,
) -> Result<ApiSuccess<DarkModeResponse>, ApiError> {
    let dark_mode = state
        .users
        .set_dark_mode(user_id, body.dark_mode)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(ApiSuccess::ok(DarkModeResponse { dark_mode }).with_message("Dark mode updated"))
}
