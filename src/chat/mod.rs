//! Assistant chat history.
//!
//! Each stored entry is one exchange: the user's message and the reply it
//! got. Listing expands every entry into two client-facing messages.

use std::cmp::Ordering;

use axum::{routing::get, Router};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::{
    scoping::{self, Resource},
    state::AppState,
    validate::{self, Checked, ValidationError},
};

mod handlers;
mod repo;

pub const MAX_MESSAGE: usize = 2000;

/// Stored for every exchange until a real assistant backend exists.
pub const PLACEHOLDER_REPLY: &str =
    "Thanks for your message. The assistant cannot answer yet, but your question has been saved.";

text_enum! {
    pub enum ChatContext {
        Productivity => "productivity",
        Task => "task",
        Goal => "goal",
        General => "general",
        Motivation => "motivation",
    }
    default General
}

text_enum! {
    pub enum Sender {
        User => "user",
        Ai => "ai",
    }
    default User
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatEntry {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_message: String,
    pub ai_response: String,
    #[sqlx(try_from = "String")]
    pub context: ChatContext,
    pub helpful: Option<bool>,
    #[serde(rename = "timestamp", with = "time::serde::rfc3339")]
    pub sent_at: OffsetDateTime,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatDraft {
    #[serde(default)]
    pub message: String,
    pub context: Option<ChatContext>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatPatch {
    pub helpful: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatFilter {
    /// Number of exchanges, newest first.
    pub limit: Option<u32>,
}

/// One side of an exchange as the client renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub user_id: Uuid,
    pub message: String,
    pub sender: Sender,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
    #[serde(rename = "type")]
    pub kind: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatExchange {
    pub user_message: ChatMessage,
    pub ai_response: ChatMessage,
}

impl ChatEntry {
    /// The reply is shown one second after the question.
    pub fn exchange(&self) -> ChatExchange {
        ChatExchange {
            user_message: ChatMessage {
                id: format!("{}_user", self.id),
                user_id: self.user_id,
                message: self.user_message.clone(),
                sender: Sender::User,
                timestamp: self.sent_at,
                kind: "user_message",
            },
            ai_response: ChatMessage {
                id: format!("{}_ai", self.id),
                user_id: self.user_id,
                message: self.ai_response.clone(),
                sender: Sender::Ai,
                timestamp: self.sent_at + Duration::seconds(1),
                kind: "ai_response",
            },
        }
    }
}

/// Flattens exchanges into messages, newest first.
pub fn transcript(entries: &[ChatEntry]) -> Vec<ChatMessage> {
    let mut messages: Vec<ChatMessage> = entries
        .iter()
        .map(ChatEntry::exchange)
        .flat_map(|e| [e.user_message, e.ai_response])
        .collect();
    messages.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    messages
}

impl Resource for ChatEntry {
    type Draft = ChatDraft;
    type Patch = ChatPatch;
    type Filter = ChatFilter;

    const LABEL: &'static str = "Chat message";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn check_draft(draft: &ChatDraft) -> Checked {
        if draft.message.trim().is_empty() {
            return Err(ValidationError::new("Please provide a message"));
        }
        validate::max_len("Message", Some(draft.message.trim()), MAX_MESSAGE)
    }

    fn check_patch(_patch: &ChatPatch) -> Checked {
        Ok(())
    }

    fn from_draft(id: Uuid, owner: Uuid, now: OffsetDateTime, draft: ChatDraft) -> Self {
        Self {
            id,
            user_id: owner,
            user_message: draft.message.trim().to_string(),
            ai_response: PLACEHOLDER_REPLY.to_string(),
            context: draft.context.unwrap_or_default(),
            helpful: None,
            sent_at: now,
        }
    }

    fn apply(&mut self, patch: &ChatPatch, _now: OffsetDateTime) {
        if let Some(helpful) = patch.helpful {
            self.helpful = Some(helpful);
        }
    }

    fn matches(&self, _filter: &ChatFilter) -> bool {
        true
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        b.sent_at.cmp(&a.sent_at)
    }

    fn limit(filter: &ChatFilter) -> Option<usize> {
        filter.limit.map(|l| l as usize)
    }
}

/// Mounted under `/api/ai`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/chat",
            get(handlers::history)
                .post(handlers::send)
                .delete(handlers::clear),
        )
        .route(
            "/chat/:id",
            get(scoping::read::<ChatEntry>)
                .put(scoping::update::<ChatEntry>)
                .delete(scoping::remove::<ChatEntry>),
        )
}
