use axum::extract::State;
use time::OffsetDateTime;
use tracing::{info, instrument};

use super::{DaySummary, Session, SessionFilter, TimerStats};
use crate::{
    auth::extractors::AuthUser,
    dates,
    error::{ApiError, AppJson},
    response::{ApiList, ApiSuccess},
    scoping::Scoped,
    state::AppState,
    users::{TimerSettings, TimerSettingsPatch},
};

#[instrument(skip(scope))]
pub async fn today(
    State(scope): State<Scoped<Session>>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiList<Session>, ApiError> {
    let sessions = scope
        .list(user_id, &SessionFilter::day(dates::today_utc()))
        .await?;
    let summary = DaySummary::from_sessions(&sessions);
    Ok(ApiList::new(sessions).with("summary", summary))
}

#[instrument(skip(scope))]
pub async fn stats(
    State(scope): State<Scoped<Session>>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiSuccess<TimerStats>, ApiError> {
    let sessions = scope.list(user_id, &SessionFilter::default()).await?;
    Ok(ApiSuccess::ok(TimerStats::compute(
        &sessions,
        OffsetDateTime::now_utc(),
    )))
}

#[instrument(skip(state))]
pub async fn get_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiSuccess<TimerSettings>, ApiError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    Ok(ApiSuccess::ok(user.timer_settings))
}

#[instrument(skip(state, patch))]
pub async fn update_settings(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    AppJson(patch): AppJson<TimerSettingsPatch>,
) -> Result<ApiSuccess<TimerSettings>, ApiError> {
    patch.check()?;
    let merged = state
        .users
        .merge_timer_settings(user_id, &patch)
        .await?
        .ok_or(ApiError::NotFound("User"))?;
    info!(%user_id, "timer settings updated");
    Ok(ApiSuccess::ok(merged).with_message("Timer settings updated successfully"))
}
