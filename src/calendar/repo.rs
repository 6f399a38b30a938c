use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Event, EventFilter, EventPatch};
use crate::{db::PgStore, scoping::OwnedStore, store::StoreError};

#[async_trait]
impl OwnedStore<Event> for PgStore {
    async fn list(&self, owner: Uuid, filter: &EventFilter) -> Result<Vec<Event>, StoreError> {
        let (month, year) = filter.period().unzip();
        let rows = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, user_id, title, description, day, month, year, color, created_at, updated_at
            FROM calendar_events
            WHERE user_id = $1
              AND ($2::int IS NULL OR (month = $2 AND year = $3))
            ORDER BY year, month, day, created_at
            "#,
        )
        .bind(owner)
        .bind(month)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, user_id, title, description, day, month, year, color, created_at, updated_at
            FROM calendar_events
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, event: Event) -> Result<Event, StoreError> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO calendar_events
                (id, user_id, title, description, day, month, year, color, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, user_id, title, description, day, month, year, color, created_at, updated_at
            "#,
        )
        .bind(event.id)
        .bind(event.user_id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.day)
        .bind(event.month)
        .bind(event.year)
        .bind(&event.color)
        .bind(event.created_at)
        .bind(event.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_write)?;
        Ok(row)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &EventPatch,
        now: OffsetDateTime,
    ) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            UPDATE calendar_events SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                day = COALESCE($5, day),
                month = COALESCE($6, month),
                year = COALESCE($7, year),
                color = COALESCE($8, color),
                updated_at = $9
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, day, month, year, color, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(patch.description.as_deref())
        .bind(patch.day)
        .bind(patch.month)
        .bind(patch.year)
        .bind(patch.color.as_deref())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Option<Event>, StoreError> {
        let row = sqlx::query_as::<_, Event>(
            r#"
            DELETE FROM calendar_events
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, day, month, year, color, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
