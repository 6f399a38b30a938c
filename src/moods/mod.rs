use std::cmp::Ordering;

use axum::{routing::get, Router};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::{
    dates,
    scoping::{crud_routes, Resource},
    state::AppState,
    validate::{self, Checked},
};

mod handlers;
mod repo;

pub const MAX_NOTES: usize = 500;
pub const DEFAULT_ENERGY: i32 = 3;

text_enum! {
    pub enum MoodKind {
        Excited => "excited",
        Happy => "happy",
        Neutral => "neutral",
        Sad => "sad",
        Stressed => "stressed",
        Angry => "angry",
    }
    default Neutral
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Mood {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(try_from = "String")]
    pub mood: MoodKind,
    pub energy_level: i32,
    pub notes: String,
    pub factors: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodDraft {
    pub mood: MoodKind,
    pub energy_level: Option<i32>,
    pub notes: Option<String>,
    #[serde(default)]
    pub factors: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodPatch {
    pub mood: Option<MoodKind>,
    pub energy_level: Option<i32>,
    pub notes: Option<String>,
    pub factors: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MoodFilter {
    /// A UTC calendar day.
    #[serde(default, deserialize_with = "dates::day_opt")]
    pub date: Option<Date>,
    pub limit: Option<u32>,
}

impl MoodFilter {
    pub fn on(day: Date) -> Self {
        Self {
            date: Some(day),
            limit: None,
        }
    }
}

fn clean_factors(factors: &[String]) -> Vec<String> {
    factors
        .iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}

impl MoodPatch {
    pub(crate) fn clean_factors(&self) -> Option<Vec<String>> {
        self.factors.as_deref().map(clean_factors)
    }
}

/// Mean energy rounded to the nearest whole level, 0 when there are no entries.
pub fn average_energy(moods: &[Mood]) -> i64 {
    if moods.is_empty() {
        return 0;
    }
    let sum: i64 = moods.iter().map(|m| i64::from(m.energy_level)).sum();
    (sum as f64 / moods.len() as f64).round() as i64
}

impl Resource for Mood {
    type Draft = MoodDraft;
    type Patch = MoodPatch;
    type Filter = MoodFilter;

    const LABEL: &'static str = "Mood entry";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn check_draft(draft: &MoodDraft) -> Checked {
        validate::in_range("energyLevel", draft.energy_level, 1, 5)?;
        validate::max_len("Notes", draft.notes.as_deref(), MAX_NOTES)
    }

    fn check_patch(patch: &MoodPatch) -> Checked {
        validate::in_range("energyLevel", patch.energy_level, 1, 5)?;
        validate::max_len("Notes", patch.notes.as_deref(), MAX_NOTES)
    }

    fn from_draft(id: Uuid, owner: Uuid, now: OffsetDateTime, draft: MoodDraft) -> Self {
        Self {
            id,
            user_id: owner,
            mood: draft.mood,
            energy_level: draft.energy_level.unwrap_or(DEFAULT_ENERGY),
            notes: draft.notes.unwrap_or_default(),
            factors: clean_factors(&draft.factors),
            date: now,
        }
    }

    /// Editing an entry re-dates it to the edit time.
    fn apply(&mut self, patch: &MoodPatch, now: OffsetDateTime) {
        if let Some(mood) = patch.mood {
            self.mood = mood;
        }
        if let Some(energy) = patch.energy_level {
            self.energy_level = energy;
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(factors) = patch.clean_factors() {
            self.factors = factors;
        }
        self.date = now;
    }

    fn matches(&self, filter: &MoodFilter) -> bool {
        filter.date.map_or(true, |d| dates::utc_day(self.date) == d)
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        b.date.cmp(&a.date)
    }

    fn limit(filter: &MoodFilter) -> Option<usize> {
        filter.limit.map(|l| l as usize)
    }
}

pub fn router() -> Router<AppState> {
    crud_routes::<Mood>().route("/today", get(handlers::today))
}
