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

pub const MAX_TITLE: usize = 100;
pub const MAX_DESCRIPTION: usize = 500;

text_enum! {
    pub enum Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
    default Medium
}

text_enum! {
    pub enum TaskStatus {
        Todo => "todo",
        InProgress => "in-progress",
        Completed => "completed",
    }
    default Todo
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: String,
    #[sqlx(try_from = "String")]
    pub priority: Priority,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    #[serde(with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskDraft {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<TaskStatus>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub deadline: Option<OffsetDateTime>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
}

impl Resource for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;
    type Filter = TaskFilter;

    const LABEL: &'static str = "Task";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn check_draft(draft: &TaskDraft) -> Checked {
        validate::required("Title", &draft.title, MAX_TITLE)?;
        validate::max_len("Description", draft.description.as_deref(), MAX_DESCRIPTION)
    }

    fn check_patch(patch: &TaskPatch) -> Checked {
        validate::required_if_present("Title", patch.title.as_deref(), MAX_TITLE)?;
        validate::max_len("Description", patch.description.as_deref(), MAX_DESCRIPTION)
    }

    fn from_draft(id: Uuid, owner: Uuid, now: OffsetDateTime, draft: TaskDraft) -> Self {
        Self {
            id,
            user_id: owner,
            title: draft.title.trim().to_string(),
            description: draft.description.unwrap_or_default(),
            priority: draft.priority.unwrap_or_default(),
            status: draft.status.unwrap_or_default(),
            deadline: draft.deadline,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, patch: &TaskPatch, now: OffsetDateTime) {
        if let Some(title) = &patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(priority) = patch.priority {
            self.priority = priority;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if patch.deadline.is_some() {
            self.deadline = patch.deadline;
        }
        self.updated_at = now;
    }

    fn matches(&self, filter: &TaskFilter) -> bool {
        filter.status.map_or(true, |s| s == self.status)
            && filter.priority.map_or(true, |p| p == self.priority)
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        b.created_at.cmp(&a.created_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn draft_defaults() {
        let draft: TaskDraft = serde_json::from_value(json!({"title": "  Ship it "})).unwrap();
        let task = Task::from_draft(Uuid::new_v4(), Uuid::new_v4(), OffsetDateTime::now_utc(), draft);
        assert_eq!(task.title, "Ship it");
        assert_eq!(task.priority, Priority::Medium);
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(task.deadline.is_none());
    }

    #[test]
    fn owner_field_in_body_is_ignored() {
        let intruder = Uuid::new_v4();
        let draft: TaskDraft = serde_json::from_value(json!({
            "title": "mine",
            "userId": intruder.to_string()
        }))
        .unwrap();
        let owner = Uuid::new_v4();
        let task = Task::from_draft(Uuid::new_v4(), owner, OffsetDateTime::now_utc(), draft);
        assert_eq!(task.user_id, owner);
    }

    #[test]
    fn title_limits() {
        let long = TaskDraft {
            title: "x".repeat(MAX_TITLE + 1),
            ..TaskDraft::default()
        };
        assert!(Task::check_draft(&long).is_err());
        assert!(Task::check_draft(&TaskDraft::default()).is_err());
    }

    #[test]
    fn status_uses_kebab_case_on_the_wire() {
        let patch: TaskPatch = serde_json::from_value(json!({"status": "in-progress"})).unwrap();
        assert_eq!(patch.status, Some(TaskStatus::InProgress));
        assert!(serde_json::from_value::<TaskPatch>(json!({"status": "done"})).is_err());
    }

    #[test]
    fn patch_keeps_unset_fields() {
        let now = OffsetDateTime::now_utc();
        let mut task = Task::from_draft(
            Uuid::new_v4(),
            Uuid::new_v4(),
            now,
            TaskDraft {
                title: "a".into(),
                description: Some("b".into()),
                ..TaskDraft::default()
            },
        );
        task.apply(
            &TaskPatch {
                priority: Some(Priority::High),
                ..TaskPatch::default()
            },
            now,
        );
        assert_eq!(task.title, "a");
        assert_eq!(task.description, "b");
        assert_eq!(task.priority, Priority::High);
    }
}
