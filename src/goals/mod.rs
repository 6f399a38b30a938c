use std::cmp::Ordering;

use axum::{
    routing::{get, put},
    Router,
};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    scoping::{self, Resource},
    state::AppState,
    validate::{self, Checked},
};

mod handlers;
mod repo;

pub const MAX_TITLE: usize = 200;
pub const MAX_DESCRIPTION: usize = 1000;
pub const NO_DEADLINE: &str = "No deadline";

text_enum! {
    pub enum DeadlineType {
        Date => "date",
        Recurring => "recurring",
        Completed => "completed",
        None => "none",
    }
    default None
}

text_enum! {
    pub enum GoalCategory {
        Learning => "learning",
        Health => "health",
        Work => "work",
        Personal => "personal",
        Financial => "financial",
        Creative => "creative",
    }
    default Personal
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub progress: i32,
    pub target: i32,
    pub deadline: String,
    #[sqlx(try_from = "String")]
    pub deadline_type: DeadlineType,
    pub completed: bool,
    pub color: String,
    #[sqlx(try_from = "String")]
    pub category: GoalCategory,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalDraft {
    pub title: String,
    pub description: Option<String>,
    pub target: i32,
    pub deadline: Option<String>,
    pub deadline_type: Option<DeadlineType>,
    pub color: Option<String>,
    pub category: Option<GoalCategory>,
}

/// Client-editable fields plus the progress controls used by the
/// `/progress` and `/complete` routes, which are never read from a body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target: Option<i32>,
    pub deadline: Option<String>,
    pub color: Option<String>,
    pub category: Option<GoalCategory>,
    #[serde(skip)]
    pub progress: Option<i32>,
    #[serde(skip)]
    pub completed: Option<bool>,
    /// Upper bound applied to progress after the other changes.
    #[serde(skip)]
    pub progress_cap: Option<i32>,
}

impl GoalPatch {
    /// Sets progress (clamped to 0..=100); reaching 100 completes the goal.
    pub fn progress(value: i64) -> Self {
        let progress = value.clamp(0, 100) as i32;
        Self {
            progress: Some(progress),
            completed: Some(progress == 100),
            ..Self::default()
        }
    }

    /// Completing sets progress to 100; reopening keeps progress below 100.
    pub fn completion(done: bool) -> Self {
        if done {
            Self {
                progress: Some(100),
                completed: Some(true),
                ..Self::default()
            }
        } else {
            Self {
                completed: Some(false),
                progress_cap: Some(99),
                ..Self::default()
            }
        }
    }

    fn deadline(&self) -> Option<&str> {
        self.deadline
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct GoalFilter {
    pub category: Option<GoalCategory>,
    pub completed: Option<bool>,
    pub limit: Option<u32>,
}

impl GoalFilter {
    /// Same conditions with no limit; list stats cover every match.
    pub fn unlimited(&self) -> Self {
        Self {
            category: self.category,
            completed: self.completed,
            limit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalStats {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub average_progress: i64,
    pub completion_rate: i64,
}

impl GoalStats {
    pub fn from_goals(goals: &[Goal]) -> Self {
        let total = goals.len();
        let completed = goals.iter().filter(|g| g.completed).count();
        let (average_progress, completion_rate) = if total == 0 {
            (0, 0)
        } else {
            let sum: i64 = goals.iter().map(|g| i64::from(g.progress)).sum();
            (
                (sum as f64 / total as f64).round() as i64,
                (completed as f64 * 100.0 / total as f64).round() as i64,
            )
        };
        Self {
            total,
            completed,
            in_progress: total - completed,
            average_progress,
            completion_rate,
        }
    }
}

impl Resource for Goal {
    type Draft = GoalDraft;
    type Patch = GoalPatch;
    type Filter = GoalFilter;

    const LABEL: &'static str = "Goal";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn check_draft(draft: &GoalDraft) -> Checked {
        validate::required("Title", &draft.title, MAX_TITLE)?;
        validate::max_len("Description", draft.description.as_deref(), MAX_DESCRIPTION)?;
        validate::at_least("Target", Some(draft.target), 1)
    }

    fn check_patch(patch: &GoalPatch) -> Checked {
        validate::required_if_present("Title", patch.title.as_deref(), MAX_TITLE)?;
        validate::max_len("Description", patch.description.as_deref(), MAX_DESCRIPTION)?;
        validate::at_least("Target", patch.target, 1)
    }

    fn from_draft(id: Uuid, owner: Uuid, now: OffsetDateTime, draft: GoalDraft) -> Self {
        let deadline = draft
            .deadline
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        let deadline_type = draft.deadline_type.unwrap_or(if deadline.is_some() {
            DeadlineType::Date
        } else {
            DeadlineType::None
        });
        Self {
            id,
            user_id: owner,
            title: draft.title.trim().to_string(),
            description: draft.description.unwrap_or_default(),
            progress: 0,
            target: draft.target,
            deadline: deadline.unwrap_or_else(|| NO_DEADLINE.to_string()),
            deadline_type,
            completed: false,
            color: draft.color.unwrap_or_else(|| "electric-red".to_string()),
            category: draft.category.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: &GoalPatch, now: OffsetDateTime) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(target) = patch.target {
            self.target = target;
        }
        if let Some(deadline) = patch.deadline() {
            self.deadline = deadline.to_string();
            self.deadline_type = DeadlineType::Date;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(progress) = patch.progress {
            self.progress = progress;
        }
        if let Some(cap) = patch.progress_cap {
            self.progress = self.progress.min(cap);
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &GoalFilter) -> bool {
        filter.category.map_or(true, |c| c == self.category)
            && filter.completed.map_or(true, |c| c == self.completed)
    }

    /// Open goals first, then by progress, most advanced first.
    fn order(a: &Self, b: &Self) -> Ordering {
        a.completed
            .cmp(&b.completed)
            .then_with(|| b.progress.cmp(&a.progress))
            .then_with(|| b.created_at.cmp(&a.created_at))
    }

    fn limit(filter: &GoalFilter) -> Option<usize> {
        filter.limit.map(|l| l as usize)
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list).post(scoping::create::<Goal>))
        .route(
            "/:id",
            get(scoping::read::<Goal>)
                .put(scoping::update::<Goal>)
                .delete(scoping::remove::<Goal>),
        )
        .route("/stats", get(handlers::stats))
        .route("/:id/progress", put(handlers::set_progress))
        .route("/:id/complete", put(handlers::set_completion))
}
