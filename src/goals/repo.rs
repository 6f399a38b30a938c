use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::{Goal, GoalFilter, GoalPatch};
use crate::{db::PgStore, scoping::OwnedStore, store::StoreError};

#[async_trait]
impl OwnedStore<Goal> for PgStore {
    async fn list(&self, owner: Uuid, filter: &GoalFilter) -> Result<Vec<Goal>, StoreError> {
        let rows = sqlx::query_as::<_, Goal>(
            r#"
            SELECT id, user_id, title, description, progress, target, deadline, deadline_type,
                   completed, color, category, created_at, updated_at
            FROM goals
            WHERE user_id = $1
              AND ($2::text IS NULL OR category = $2)
              AND ($3::boolean IS NULL OR completed = $3)
            ORDER BY completed ASC, progress DESC, created_at DESC
            LIMIT $4
            "#,
        )
        .bind(owner)
        .bind(filter.category.map(|c| c.as_str()))
        .bind(filter.completed)
        .bind(filter.limit.map(i64::from))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<Goal>, StoreError> {
        let row = sqlx::query_as::<_, Goal>(
            r#"
            SELECT id, user_id, title, description, progress, target, deadline, deadline_type,
                   completed, color, category, created_at, updated_at
            FROM goals
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert(&self, goal: Goal) -> Result<Goal, StoreError> {
        let row = sqlx::query_as::<_, Goal>(
            r#"
            INSERT INTO goals (id, user_id, title, description, progress, target, deadline,
                               deadline_type, completed, color, category, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING id, user_id, title, description, progress, target, deadline, deadline_type,
                      completed, color, category, created_at, updated_at
            "#,
        )
        .bind(goal.id)
        .bind(goal.user_id)
        .bind(&goal.title)
        .bind(&goal.description)
        .bind(goal.progress)
        .bind(goal.target)
        .bind(&goal.deadline)
        .bind(goal.deadline_type.as_str())
        .bind(goal.completed)
        .bind(&goal.color)
        .bind(goal.category.as_str())
        .bind(goal.created_at)
        .bind(goal.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_write)?;
        Ok(row)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &GoalPatch,
        now: OffsetDateTime,
    ) -> Result<Option<Goal>, StoreError> {
        let row = sqlx::query_as::<_, Goal>(
            r#"
            UPDATE goals SET
                title = COALESCE($3, title),
                description = COALESCE($4, description),
                target = COALESCE($5, target),
                deadline = COALESCE($6, deadline),
                deadline_type = CASE WHEN $6::text IS NULL THEN deadline_type ELSE 'date' END,
                color = COALESCE($7, color),
                category = COALESCE($8, category),
                progress = LEAST(COALESCE($9, progress), COALESCE($10, 100)),
                completed = COALESCE($11, completed),
                updated_at = $12
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, progress, target, deadline, deadline_type,
                      completed, color, category, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(patch.description.as_deref())
        .bind(patch.target)
        .bind(patch.deadline())
        .bind(patch.color.as_deref())
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.progress)
        .bind(patch.progress_cap)
        .bind(patch.completed)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Option<Goal>, StoreError> {
        let row = sqlx::query_as::<_, Goal>(
            r#"
            DELETE FROM goals
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, progress, target, deadline, deadline_type,
                      completed, color, category, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }
}
