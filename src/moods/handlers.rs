use axum::extract::State;
use tracing::instrument;

use super::{average_energy, Mood, MoodFilter};
use crate::{
    auth::extractors::AuthUser, dates, error::ApiError, response::ApiList, scoping::Scoped,
};

/// Entries logged during the current UTC day, with their mean energy.
#[instrument(skip(scope))]
pub async fn today(
    State(scope): State<Scoped<Mood>>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiList<Mood>, ApiError> {
    let moods = scope
        .list(user_id, &MoodFilter::on(dates::today_utc()))
        .await?;
    let average = average_energy(&moods);
    Ok(ApiList::new(moods).with("averageEnergy", average))
}
