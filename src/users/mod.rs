use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::store::StoreError;
use crate::validate::{self, Checked};

mod repo;

text_enum! {
    pub enum AccentColor {
        ElectricRed => "electric-red",
        VibrantYellow => "vibrant-yellow",
        BrightBlue => "bright-blue",
        EmeraldGreen => "emerald-green",
    }
    default ElectricRed
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub email: bool,
    pub push: bool,
    pub sounds: bool,
    pub reminders: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email: true,
            push: true,
            sounds: false,
            reminders: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrivacySettings {
    pub profile_visible: bool,
    pub activity_visible: bool,
    pub data_sharing: bool,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self {
            profile_visible: true,
            activity_visible: false,
            data_sharing: true,
        }
    }
}

/// Per-user UI preferences. Missing fields fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub dark_mode: bool,
    pub notifications: NotificationSettings,
    pub privacy: PrivacySettings,
    pub accent_color: AccentColor,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_mode: true,
            notifications: NotificationSettings::default(),
            privacy: PrivacySettings::default(),
            accent_color: AccentColor::default(),
        }
    }
}

/// Timer preferences, durations in seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimerSettings {
    pub focus_duration: u32,
    pub break_duration: u32,
    pub long_break_duration: u32,
    pub sessions_before_long_break: u32,
    pub auto_start_breaks: bool,
    pub auto_start_focus: bool,
    pub sound_enabled: bool,
    pub notifications: bool,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            focus_duration: 1500,
            break_duration: 300,
            long_break_duration: 900,
            sessions_before_long_break: 4,
            auto_start_breaks: true,
            auto_start_focus: false,
            sound_enabled: true,
            notifications: true,
        }
    }
}

impl TimerSettings {
    pub fn merge(&mut self, patch: &TimerSettingsPatch) {
        if let Some(v) = patch.focus_duration {
            self.focus_duration = v;
        }
        if let Some(v) = patch.break_duration {
            self.break_duration = v;
        }
        if let Some(v) = patch.long_break_duration {
            self.long_break_duration = v;
        }
        if let Some(v) = patch.sessions_before_long_break {
            self.sessions_before_long_break = v;
        }
        if let Some(v) = patch.auto_start_breaks {
            self.auto_start_breaks = v;
        }
        if let Some(v) = patch.auto_start_focus {
            self.auto_start_focus = v;
        }
        if let Some(v) = patch.sound_enabled {
            self.sound_enabled = v;
        }
        if let Some(v) = patch.notifications {
            self.notifications = v;
        }
    }
}

/// Partial timer settings update. Serializes only the present fields so it
/// can be merged into the stored JSON document as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_break_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions_before_long_break: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_start_breaks: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_start_focus: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<bool>,
}

impl TimerSettingsPatch {
    pub fn check(&self) -> Checked {
        validate::at_least("focusDuration", self.focus_duration, 1)?;
        validate::at_least("breakDuration", self.break_duration, 1)?;
        validate::at_least("longBreakDuration", self.long_break_duration, 1)?;
        validate::at_least("sessionsBeforeLongBreak", self.sessions_before_long_break, 1)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub settings: Settings,
    #[serde(skip_serializing)]
    pub timer_settings: TimerSettings,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// A validated signup, password already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub settings: Settings,
    pub created_at: OffsetDateTime,
}

impl From<NewUser> for User {
    fn from(new: NewUser) -> Self {
        Self {
            id: new.id,
            username: new.username,
            email: new.email,
            password_hash: new.password_hash,
            settings: new.settings,
            timer_settings: TimerSettings::default(),
            created_at: new.created_at,
            updated_at: new.created_at,
        }
    }
}

/// Credential store port. Email lookups expect the normalized (lowercase) form.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new: NewUser) -> Result<User, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
    /// Returns false when no such user exists.
    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError>;
    async fn replace_settings(
        &self,
        id: Uuid,
        settings: &Settings,
    ) -> Result<Option<Settings>, StoreError>;
    async fn set_dark_mode(&self, id: Uuid, dark_mode: bool) -> Result<Option<bool>, StoreError>;
    async fn merge_timer_settings(
        &self,
        id: Uuid,
        patch: &TimerSettingsPatch,
    ) -> Result<Option<TimerSettings>, StoreError>;
    async fn ping(&self) -> Result<(), StoreError>;
}
