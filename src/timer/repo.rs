use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Session, SessionFilter, SessionPatch};
use crate::{db::PgStore, scoping::OwnedStore, store::StoreError};

#[async_trait]
impl OwnedStore<Session> for PgStore {
    async fn list(&self, owner: Uuid, filter: &SessionFilter) -> Result<Vec<Session>, StoreError> {
        let rows = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, duration, timer_type, notes, start_time, end_time, completed
            FROM timer_sessions
            WHERE user_id = $1
              AND ($2::text IS NULL OR timer_type = $2)
              AND ($3::timestamptz IS NULL OR start_time >= $3)
              AND ($4::timestamptz IS NULL OR start_time <= $4)
              AND ($5::timestamptz IS NULL OR start_time < $5)
            ORDER BY start_time DESC
            LIMIT $6
            "#,
        )
        .bind(owner)
        .bind(filter.timer_type.map(|t| t.as_str()))
        .bind(filter.start_date)
        .bind(filter.end_date)
        .bind(filter.before)
        .bind(filter.limit.map(i64::from))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, duration, timer_type, notes, start_time, end_time, completed
            FROM timer_sessions
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, session: Session) -> Result<Session, StoreError> {
        let row = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO timer_sessions
                (id, user_id, duration, timer_type, notes, start_time, end_time, completed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id, user_id, duration, timer_type, notes, start_time, end_time, completed
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(session.duration)
        .bind(session.timer_type.as_str())
        .bind(&session.notes)
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(session.completed)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_write)?;
        Ok(row)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &SessionPatch,
        _now: OffsetDateTime,
    ) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query_as::<_, Session>(
            r#"
            UPDATE timer_sessions SET
                notes = COALESCE($3, notes),
                end_time = COALESCE($4, end_time),
                duration = COALESCE($5, duration)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, duration, timer_type, notes, start_time, end_time, completed
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.notes.as_deref())
        .bind(patch.end_time)
        .bind(patch.duration)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Option<Session>, StoreError> {
        let row = sqlx::query_as::<_, Session>(
            r#"
            DELETE FROM timer_sessions
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, duration, timer_type, notes, start_time, end_time, completed
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
