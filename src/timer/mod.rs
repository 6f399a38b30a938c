use std::{cmp::Ordering, collections::HashSet};

use axum::{routing::get, Router};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Duration, OffsetDateTime};
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
pub const WEEKLY_FOCUS_TARGET: usize = 20;
const STREAK_WINDOW_DAYS: i64 = 7;

text_enum! {
    pub enum TimerType {
        Pomodoro => "pomodoro",
        Break => "break",
        DeepWork => "deep-work",
        Custom => "custom",
    }
    default Pomodoro
}

impl TimerType {
    pub fn is_focus(self) -> bool {
        matches!(self, Self::Pomodoro | Self::DeepWork)
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Minutes.
    pub duration: i32,
    #[sqlx(try_from = "String")]
    pub timer_type: TimerType,
    pub notes: String,
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    pub completed: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDraft {
    pub duration: i32,
    pub timer_type: TimerType,
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_time: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
}

/// Only notes, end time and duration can change after a session is logged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionPatch {
    pub notes: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_time: Option<OffsetDateTime>,
    pub duration: Option<i32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFilter {
    pub timer_type: Option<TimerType>,
    /// Inclusive lower bound on `startTime`.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub start_date: Option<OffsetDateTime>,
    /// Inclusive upper bound on `startTime`.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub end_date: Option<OffsetDateTime>,
    /// Exclusive upper bound, used for whole-day windows.
    #[serde(skip)]
    pub before: Option<OffsetDateTime>,
    pub limit: Option<u32>,
}

impl SessionFilter {
    pub fn day(day: time::Date) -> Self {
        Self {
            start_date: Some(day.midnight().assume_utc()),
            before: dates::day_bounds(day).map(|(_, end)| end),
            ..Self::default()
        }
    }
}

impl Resource for Session {
    type Draft = SessionDraft;
    type Patch = SessionPatch;
    type Filter = SessionFilter;

    const LABEL: &'static str = "Timer session";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner_id(&self) -> Uuid {
        self.user_id
    }

    fn check_draft(draft: &SessionDraft) -> Checked {
        validate::at_least("duration", Some(draft.duration), 1)?;
        validate::max_len("Notes", draft.notes.as_deref(), MAX_NOTES)
    }

    fn check_patch(patch: &SessionPatch) -> Checked {
        validate::at_least("duration", patch.duration, 1)?;
        validate::max_len("Notes", patch.notes.as_deref(), MAX_NOTES)
    }

    fn from_draft(id: Uuid, owner: Uuid, now: OffsetDateTime, draft: SessionDraft) -> Self {
        Self {
            id,
            user_id: owner,
            duration: draft.duration,
            timer_type: draft.timer_type,
            notes: draft.notes.unwrap_or_default(),
            start_time: draft.start_time.unwrap_or(now),
            end_time: draft.end_time.unwrap_or(now),
            completed: true,
        }
    }

    fn apply(&mut self, patch: &SessionPatch, _now: OffsetDateTime) {
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
        if let Some(end) = patch.end_time {
            self.end_time = end;
        }
        if let Some(duration) = patch.duration {
            self.duration = duration;
        }
    }

    fn matches(&self, filter: &SessionFilter) -> bool {
        filter.timer_type.map_or(true, |t| t == self.timer_type)
            && filter.start_date.map_or(true, |s| self.start_time >= s)
            && filter.end_date.map_or(true, |e| self.start_time <= e)
            && filter.before.map_or(true, |b| self.start_time < b)
    }

    fn order(a: &Self, b: &Self) -> Ordering {
        b.start_time.cmp(&a.start_time)
    }

    fn limit(filter: &SessionFilter) -> Option<usize> {
        filter.limit.map(|l| l as usize)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub total_sessions: usize,
    pub focus_sessions: usize,
    pub break_sessions: usize,
    pub total_focus_time: i64,
    pub total_break_time: i64,
    pub streak_maintained: bool,
}

impl DaySummary {
    pub fn from_sessions(sessions: &[Session]) -> Self {
        let totals = Totals::of(sessions);
        Self {
            total_sessions: sessions.len(),
            focus_sessions: totals.focus_sessions,
            break_sessions: totals.break_sessions,
            total_focus_time: totals.focus_minutes,
            total_break_time: totals.break_minutes,
            streak_maintained: totals.focus_sessions > 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyGoal {
    pub target: usize,
    pub current: usize,
    pub progress: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerStats {
    pub total_sessions: usize,
    pub focus_sessions: usize,
    pub break_sessions: usize,
    pub total_focus_time: i64,
    pub total_break_time: i64,
    pub average_focus_per_session: i64,
    /// Distinct active days in the trailing week.
    pub streak: usize,
    pub weekly_goal: WeeklyGoal,
}

impl TimerStats {
    pub fn compute(sessions: &[Session], now: OffsetDateTime) -> Self {
        let totals = Totals::of(sessions);
        let average_focus_per_session = if totals.focus_sessions == 0 {
            0
        } else {
            (totals.focus_minutes as f64 / totals.focus_sessions as f64).round() as i64
        };

        let window_start = now - Duration::days(STREAK_WINDOW_DAYS);
        let active_days: HashSet<_> = sessions
            .iter()
            .filter(|s| s.start_time >= window_start)
            .map(|s| dates::utc_day(s.start_time))
            .collect();

        let progress = (totals.focus_sessions as f64 / WEEKLY_FOCUS_TARGET as f64 * 100.0).min(100.0);

        Self {
            total_sessions: sessions.len(),
            focus_sessions: totals.focus_sessions,
            break_sessions: totals.break_sessions,
            total_focus_time: totals.focus_minutes,
            total_break_time: totals.break_minutes,
            average_focus_per_session,
            streak: active_days.len().min(STREAK_WINDOW_DAYS as usize),
            weekly_goal: WeeklyGoal {
                target: WEEKLY_FOCUS_TARGET,
                current: totals.focus_sessions,
                progress,
            },
        }
    }
}

#[derive(Default)]
struct Totals {
    focus_sessions: usize,
    break_sessions: usize,
    focus_minutes: i64,
    break_minutes: i64,
}

impl Totals {
    fn of(sessions: &[Session]) -> Self {
        sessions.iter().fold(Self::default(), |mut t, s| {
            match s.timer_type {
                kind if kind.is_focus() => {
                    t.focus_sessions += 1;
                    t.focus_minutes += i64::from(s.duration);
                }
                TimerType::Break => {
                    t.break_sessions += 1;
                    t.break_minutes += i64::from(s.duration);
                }
                _ => {}
            }
            t
        })
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sessions/today", get(handlers::today))
        .nest("/sessions", crud_routes::<Session>())
        .route("/stats", get(handlers::stats))
        .route(
            "/settings",
            get(handlers::get_settings).put(handlers::update_settings),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use time::macros::{date, datetime};

    fn session(kind: TimerType, minutes: i32, start: OffsetDateTime) -> Session {
        Session::from_draft(
            Uuid::new_v4(),
            Uuid::new_v4(),
            start,
            SessionDraft {
                duration: minutes,
                timer_type: kind,
                start_time: Some(start),
                ..SessionDraft::default()
            },
        )
    }

    #[test]
    fn duration_and_type_are_required() {
        assert!(serde_json::from_value::<SessionDraft>(json!({"duration": 25})).is_err());
        assert!(serde_json::from_value::<SessionDraft>(json!({"timerType": "break"})).is_err());
        assert!(serde_json::from_value::<SessionDraft>(json!({"duration": 5, "timerType": "nap"})).is_err());
    }

    #[test]
    fn zero_duration_is_rejected() {
        let draft = SessionDraft {
            duration: 0,
            ..SessionDraft::default()
        };
        assert!(Session::check_draft(&draft).is_err());
    }

    #[test]
    fn times_default_to_now_and_sessions_start_completed() {
        let now = datetime!(2024-06-01 10:00 UTC);
        let s = Session::from_draft(
            Uuid::new_v4(),
            Uuid::new_v4(),
            now,
            SessionDraft {
                duration: 25,
                ..SessionDraft::default()
            },
        );
        assert_eq!(s.start_time, now);
        assert_eq!(s.end_time, now);
        assert!(s.completed);
    }

    #[test]
    fn day_filter_is_half_open() {
        let filter = SessionFilter::day(date!(2024 - 06 - 01));
        assert!(session(TimerType::Pomodoro, 25, datetime!(2024-06-01 0:00 UTC)).matches(&filter));
        assert!(!session(TimerType::Pomodoro, 25, datetime!(2024-06-02 0:00 UTC)).matches(&filter));
    }

    #[test]
    fn last_day_filter_is_open_ended() {
        let filter = SessionFilter::day(date!(9999 - 12 - 31));
        assert!(filter.before.is_none());
        assert_eq!(filter.start_date, Some(datetime!(9999-12-31 0:00 UTC)));
    }

    #[test]
    fn summary_splits_focus_and_break() {
        let at = datetime!(2024-06-01 9:00 UTC);
        let sessions = [
            session(TimerType::Pomodoro, 25, at),
            session(TimerType::DeepWork, 50, at),
            session(TimerType::Break, 5, at),
            session(TimerType::Custom, 10, at),
        ];
        let summary = DaySummary::from_sessions(&sessions);
        assert_eq!(summary.total_sessions, 4);
        assert_eq!(summary.focus_sessions, 2);
        assert_eq!(summary.break_sessions, 1);
        assert_eq!(summary.total_focus_time, 75);
        assert_eq!(summary.total_break_time, 5);
        assert!(summary.streak_maintained);

        assert!(!DaySummary::from_sessions(&sessions[2..]).streak_maintained);
    }

    #[test]
    fn stats_count_active_days_in_the_last_week() {
        let now = datetime!(2024-06-10 12:00 UTC);
        let sessions = [
            session(TimerType::Pomodoro, 25, datetime!(2024-06-10 8:00 UTC)),
            session(TimerType::Pomodoro, 25, datetime!(2024-06-10 9:00 UTC)),
            session(TimerType::Pomodoro, 30, datetime!(2024-06-08 9:00 UTC)),
            session(TimerType::Break, 5, datetime!(2024-05-01 9:00 UTC)),
        ];
        let stats = TimerStats::compute(&sessions, now);
        assert_eq!(stats.streak, 2);
        assert_eq!(stats.focus_sessions, 3);
        assert_eq!(stats.average_focus_per_session, 27);
        assert_eq!(stats.weekly_goal.current, 3);
        assert!((stats.weekly_goal.progress - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weekly_goal_progress_caps_at_100() {
        let now = OffsetDateTime::now_utc();
        let sessions: Vec<_> = (0..25)
            .map(|_| session(TimerType::Pomodoro, 25, now))
            .collect();
        assert_eq!(TimerStats::compute(&sessions, now).weekly_goal.progress, 100.0);
    }
}
