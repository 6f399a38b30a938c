use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Note, NoteFilter, NotePatch};
use crate::{db::PgStore, scoping::OwnedStore, store::StoreError};

#[async_trait]
impl OwnedStore<Note> for PgStore {
    async fn list(&self, owner: Uuid, filter: &NoteFilter) -> Result<Vec<Note>, StoreError> {
        let tag = filter
            .tag
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty());
        let rows = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, user_id, title, content, tags, created_at, updated_at
            FROM notes
            WHERE user_id = $1
              AND ($2::text IS NULL OR $2 = ANY(tags))
            ORDER BY updated_at DESC
            "#,
        )
        .bind(owner)
        .bind(tag)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<Note>, StoreError> {
        let row = sqlx::query_as::<_, Note>(
            r#"
            SELECT id, user_id, title, content, tags, created_at, updated_at
            FROM notes
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, note: Note) -> Result<Note, StoreError> {
        let row = sqlx::query_as::<_, Note>(
            r#"
            INSERT INTO notes (id, user_id, title, content, tags, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, title, content, tags, created_at, updated_at
            "#,
        )
        .bind(note.id)
        .bind(note.user_id)
        .bind(&note.title)
        .bind(&note.content)
        .bind(&note.tags)
        .bind(note.created_at)
        .bind(note.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_write)?;
        Ok(row)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &NotePatch,
        now: OffsetDateTime,
    ) -> Result<Option<Note>, StoreError> {
        let row = sqlx::query_as::<_, Note>(
            r#"
            UPDATE notes SET
                title = COALESCE($3, title),
                content = COALESCE($4, content),
                tags = COALESCE($5, tags),
                updated_at = $6
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, content, tags, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(patch.content.as_deref())
        .bind(patch.clean_tags())
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Option<Note>, StoreError> {
        let row = sqlx::query_as::<_, Note>(
            r#"
            DELETE FROM notes
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, content, tags, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
