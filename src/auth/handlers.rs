use axum::extract::State;
use tracing::instrument;

use super::{
    credentials::Registration,
    dto::{AuthResponse, ChangePasswordRequest, LoginRequest, RegisterRequest},
    extractors::AuthUser,
};
use crate::{
    error::{ApiError, AppJson},
    response::ApiSuccess,
    state::AppState,
    users::User,
};

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> Result<ApiSuccess<AuthResponse>, ApiError> {
    let user = state
        .credentials
        .create_user(Registration {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            settings: payload.settings,
        })
        .await?;
    let token = state.keys.issue(user.id).map_err(ApiError::internal)?;

    Ok(ApiSuccess::created(AuthResponse { token, user })
        .with_message("User registered successfully"))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<ApiSuccess<AuthResponse>, ApiError> {
    let user = state
        .credentials
        .verify_credentials(&payload.email, &payload.password)
        .await?;
    let token = state.keys.issue(user.id).map_err(ApiError::internal)?;

    Ok(ApiSuccess::ok(AuthResponse { token, user }).with_message("Login successful"))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiSuccess<User>, ApiError> {
    let user = state.credentials.find_user(user_id).await?;
    Ok(ApiSuccess::ok(user))
}

#[instrument(skip(state, payload))]
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(payload): AppJson<ChangePasswordRequest>,
) -> Result<ApiSuccess<()>, ApiError> {
    state
        .credentials
        .change_password(user_id, &payload.current_password, &payload.new_password)
        .await?;
    Ok(ApiSuccess::message("Password updated successfully"))
}
