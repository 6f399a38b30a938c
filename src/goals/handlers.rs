use axum::extract::{Path, State};
use serde::Deserialize;
use tracing::instrument;

use super::{Goal, GoalFilter, GoalPatch, GoalStats};
use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, AppJson, AppQuery},
    response::{ApiList, ApiSuccess},
    scoping::{Resource, Scoped},
};

#[derive(Debug, Deserialize)]
pub struct ProgressRequest {
    pub progress: i64,
}

#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    pub completed: bool,
}

/// Lists goals with `stats` computed over every match, before the limit.
#[instrument(skip(scope, filter))]
pub async fn list(
    State(scope): State<Scoped<Goal>>,
    AuthUser(user_id): AuthUser,
    AppQuery(filter): AppQuery<GoalFilter>,
) -> Result<ApiList<Goal>, ApiError> {
    let mut goals = scope.list(user_id, &filter.unlimited()).await?;
    let stats = GoalStats::from_goals(&goals);
    if let Some(limit) = Goal::limit(&filter) {
        goals.truncate(limit);
    }
    Ok(ApiList::new(goals).with("stats", stats))
}

#[instrument(skip(scope))]
pub async fn stats(
    State(scope): State<Scoped<Goal>>,
    AuthUser(user_id): AuthUser,
) -> Result<ApiSuccess<GoalStats>, ApiError> {
    let goals = scope.list(user_id, &GoalFilter::default()).await?;
    Ok(ApiSuccess::ok(GoalStats::from_goals(&goals)))
}

#[instrument(skip(scope, body))]
pub async fn set_progress(
    State(scope): State<Scoped<Goal>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<ProgressRequest>,
) -> Result<ApiSuccess<Goal>, ApiError> {
    let goal = scope
        .apply(user_id, &id, GoalPatch::progress(body.progress))
        .await?;
    let message = format!("Progress updated to {}%", goal.progress);
    Ok(ApiSuccess::ok(goal).with_message(message))
}

#[instrument(skip(scope, body))]
pub async fn set_completion(
    State(scope): State<Scoped<Goal>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    AppJson(body): AppJson<CompletionRequest>,
) -> Result<ApiSuccess<Goal>, ApiError> {
    let goal = scope
        .apply(user_id, &id, GoalPatch::completion(body.completed))
        .await?;
    let message = if goal.completed {
        "Goal marked as completed!"
    } else {
        "Goal marked as in progress"
    };
    Ok(ApiSuccess::ok(goal).with_message(message))
}
