use std::cmp::Ordering;

use axum::Router;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    scoping::{crud_routes, Resource},
    state::AppState,
    validate::{self, Checked},
};

mod repo;

pub const MAX_TITLE: usize = 200;
pub const MAX_DESCRIPTION: usize = 1000;
pub const DEFAULT_COLOR: &str = "bright-blue";

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub color: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    pub day: i32,
    pub month: i32,
    pub year: i32,
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub day: Option<i32>,
    pub month: Option<i32>,
    pub year: Option<i32>,
    pub color: Option<String>,
}

/// `month` and `year` narrow the listing only when both are given.
#[derive(Debug, Default, Deserialize)]
pub struct EventFilter {
    pub month: Option<i32>,
    pub year: Option<i32>,
}

impl EventFilter {
    pub(crate) fn period(&self) -> Option<(i32, i32)> {
        self.month.zip(self.year)
    }
}

fn check_date(day: Option<i32>, month: Option<i32>, year: Option<i32>) -> Checked {
    validate::in_range("day", day, 1, 31)?;
    validate::in_range("month", month, 1, 12)?;
    validate::in_range("year", year, 2000, 2100)
}

impl Resource for Event {
    type Draft = EventDraft;
    type Patch = EventPatch;
    type Filter = EventFilter;

    const LABEL: &'static str = "Event";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn check_draft(draft: &EventDraft) -> Checked {
        validate::required("Title", &draft.title, MAX_TITLE)?;
        validate::max_len("Description", draft.description.as_deref(), MAX_DESCRIPTION)?;
        check_date(Some(draft.day), Some(draft.month), Some(draft.year))
    }

    fn check_patch(patch: &EventPatch) -> Checked {
        validate::required_if_present("Title", patch.title.as_deref(), MAX_TITLE)?;
        validate::max_len("Description", patch.description.as_deref(), MAX_DESCRIPTION)?;
        check_date(patch.day, patch.month, patch.year)
    }

    fn from_draft(id: Uuid, owner: Uuid, now: OffsetDateTime, draft: EventDraft) -> Self {
        Self {
            id,
            user_id: owner,
            title: draft.title.trim().to_string(),
            description: draft.description.unwrap_or_default(),
            day: draft.day,
            month: draft.month,
            year: draft.year,
            color: draft.color.unwrap_or_else(|| DEFAULT_COLOR.to_string()),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: &EventPatch, now: OffsetDateTime) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(day) = patch.day {
            self.day = day;
        }
        if let Some(month) = patch.month {
            self.month = month;
        }
        if let Some(year) = patch.year {
            self.year = year;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &EventFilter) -> bool {
        filter
            .period()
            .map_or(true, |(month, year)| self.month == month && self.year == year)
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        (a.year, a.month, a.day, a.created_at).cmp(&(b.year, b.month, b.day, b.created_at))
    }
}

pub fn router() -> Router<AppState> {
    crud_routes::<Event>()
}
