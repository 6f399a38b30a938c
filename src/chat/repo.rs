use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{ChatEntry, ChatFilter, ChatPatch};
use crate::{db::PgStore, scoping::OwnedStore, store::StoreError};

#[async_trait]
impl OwnedStore<ChatEntry> for PgStore {
    async fn list(&self, owner: Uuid, filter: &ChatFilter) -> Result<Vec<ChatEntry>, StoreError> {
        let rows = sqlx::query_as::<_, ChatEntry>(
            r#"
            SELECT id, user_id, user_message, ai_response, context, helpful, sent_at
            FROM chat_messages
            WHERE user_id = $1
            ORDER BY sent_at DESC
            LIMIT $2
            "#,
        )
        .bind(owner)
        .bind(filter.limit.map(i64::from))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<ChatEntry>, StoreError> {
        let row = sqlx::query_as::<_, ChatEntry>(
            r#"
            SELECT id, user_id, user_message, ai_response, context, helpful, sent_at
            FROM chat_messages
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, entry: ChatEntry) -> Result<ChatEntry, StoreError> {
        let row = sqlx::query_as::<_, ChatEntry>(
            r#"
            INSERT INTO chat_messages (id, user_id, user_message, ai_response, context, helpful, sent_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, user_id, user_message, ai_response, context, helpful, sent_at
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(&entry.user_message)
        .bind(&entry.ai_response)
        .bind(entry.context.as_str())
        .bind(entry.helpful)
        .bind(entry.sent_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_write)?;
        Ok(row)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &ChatPatch,
        _now: OffsetDateTime,
    ) -> Result<Option<ChatEntry>, StoreError> {
        let row = sqlx::query_as::<_, ChatEntry>(
            r#"
            UPDATE chat_messages SET
                helpful = COALESCE($3, helpful)
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, user_message, ai_response, context, helpful, sent_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.helpful)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Option<ChatEntry>, StoreError> {
        let row = sqlx::query_as::<_, ChatEntry>(
            r#"
            DELETE FROM chat_messages
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, user_message, ai_response, context, helpful, sent_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn clear(&self, owner: Uuid) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM chat_messages WHERE user_id = $1")
            .bind(owner)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
