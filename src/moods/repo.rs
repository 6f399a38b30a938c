use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Mood, MoodFilter, MoodPatch};
use crate::{dates, db::PgStore, scoping::OwnedStore, store::StoreError};

#[async_trait]
impl OwnedStore<Mood> for PgStore {
    async fn list(&self, owner: Uuid, filter: &MoodFilter) -> Result<Vec<Mood>, StoreError> {
        // The last representable day has no exclusive end.
        let from = filter.date.map(|d| d.midnight().assume_utc());
        let until = filter.date.and_then(dates::day_bounds).map(|(_, end)| end);
        let rows = sqlx::query_as::<_, Mood>(
            r#"
            SELECT id, user_id, mood, energy_level, notes, factors, date
            FROM moods
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR date >= $2)
              AND ($3::timestamptz IS NULL OR date < $3)
            ORDER BY date DESC
            LIMIT $4
            "#,
        )
        .bind(owner)
        .bind(from)
        .bind(until)
        .bind(filter.limit.map(i64::from))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<Mood>, StoreError> {
        let row = sqlx::query_as::<_, Mood>(
            r#"
            SELECT id, user_id, mood, energy_level, notes, factors, date
            FROM moods
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, mood: Mood) -> Result<Mood, StoreError> {
        let row = sqlx::query_as::<_, Mood>(
            r#"
            INSERT INTO moods (id, user_id, mood, energy_level, notes, factors, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, mood, energy_level, notes, factors, date
            "#,
        )
        .bind(mood.id)
        .bind(mood.user_id)
        .bind(mood.mood.as_str())
        .bind(mood.energy_level)
        .bind(&mood.notes)
        .bind(&mood.factors)
        .bind(mood.date)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_write)?;
        Ok(row)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &MoodPatch,
        now: OffsetDateTime,
    ) -> Result<Option<Mood>, StoreError> {
        let row = sqlx::query_as::<_, Mood>(
            r#"
            UPDATE moods SET
                mood = COALESCE($3, mood),
                energy_level = COALESCE($4, energy_level),
                notes = COALESCE($5, notes),
                factors = COALESCE($6, factors),
                date = $7
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, mood, energy_level, notes, factors, date
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.mood.map(|m| m.as_str()))
        .bind(patch.energy_level)
        .bind(patch.notes.as_deref())
        .bind(patch.clean_factors())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Option<Mood>, StoreError> {
        let row = sqlx::query_as::<_, Mood>(
            r#"
            DELETE FROM moods
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, mood, energy_level, notes, factors, date
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
