use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    scoping::Resource,
    validate::{self, Checked},
};

mod repo;

pub const MAX_TITLE: usize = 200;
pub const MAX_CONTENT: usize = 5000;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NoteFilter {
    pub tag: Option<String>,
}

/// Trimmed, non-empty tags in their original order.
fn clean_tags(tags: &[String]) -> Vec<String> {
    tags.iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

impl NotePatch {
    pub(crate) fn clean_tags(&self) -> Option<Vec<String>> {
        self.tags.as_deref().map(clean_tags)
    }
}

impl Resource for Note {
    type Draft = NoteDraft;
    type Patch = NotePatch;
    type Filter = NoteFilter;

    const LABEL: &'static str = "Note";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn check_draft(draft: &NoteDraft) -> Checked {
        validate::required("Title", &draft.title, MAX_TITLE)?;
        validate::required("Content", &draft.content, MAX_CONTENT)
    }

    fn check_patch(patch: &NotePatch) -> Checked {
        validate::required_if_present("Title", patch.title.as_deref(), MAX_TITLE)?;
        validate::required_if_present("Content", patch.content.as_deref(), MAX_CONTENT)
    }

    fn from_draft(id: Uuid, owner: Uuid, now: OffsetDateTime, draft: NoteDraft) -> Self {
        Self {
            id,
            user_id: owner,
            title: draft.title.trim().to_string(),
            content: draft.content,
            tags: clean_tags(&draft.tags),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: &NotePatch, now: OffsetDateTime) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        if let Some(tags) = patch.clean_tags() {
            self.tags = tags;
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &NoteFilter) -> bool {
        match filter.tag.as_deref().map(str::trim) {
            Some(tag) if !tag.is_empty() => self.tags.iter().any(|t| t == tag),
            _ => true,
        }
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        b.updated_at.cmp(&a.updated_at)
    }
}
