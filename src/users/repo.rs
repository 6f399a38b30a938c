use async_trait::async_trait;
use sqlx::{types::Json, FromRow};
use time::OffsetDateTime;
use uuid::Uuid;

use super::{NewUser, Settings, TimerSettings, TimerSettingsPatch, User, UserStore};
use crate::{db::PgStore, store::StoreError};

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    settings: Json<Settings>,
    timer_settings: Json<TimerSettings>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            settings: row.settings.0,
            timer_settings: row.timer_settings.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, username, email, password_hash, settings, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id, username, email, password_hash, settings, timer_settings,
                      created_at, updated_at
            "#,
        )
        .bind(new.id)
        .bind(&new.username)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(Json(&new.settings))
        .bind(new.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(StoreError::from_write)?;
        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, settings, timer_settings,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, settings, timer_settings,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let done = sqlx::query(
            r#"UPDATE users SET password_hash = $2, updated_at = now() WHERE id = $1"#,
        )
        .bind(id)
        .bind(password_hash)
        .execute(&self.pool)
        .await?;
        Ok(done.rows_affected() == 1)
    }

    async fn replace_settings(
        &self,
        id: Uuid,
        settings: &Settings,
    ) -> Result<Option<Settings>, StoreError> {
        let row: Option<(Json<Settings>,)> = sqlx::query_as(
            r#"
            UPDATE users SET settings = $2, updated_at = now()
            WHERE id = $1
            RETURNING settings
            "#,
        )
        .bind(id)
        .bind(Json(settings))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(s,)| s.0))
    }

    async fn set_dark_mode(&self, id: Uuid, dark_mode: bool) -> Result<Option<bool>, StoreError> {
        let row: Option<(Json<Settings>,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET settings = jsonb_set(settings, '{darkMode}', to_jsonb($2::boolean)),
                updated_at = now()
            WHERE id = $1
            RETURNING settings
            "#,
        )
        .bind(id)
        .bind(dark_mode)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(s,)| s.0.dark_mode))
    }

    async fn merge_timer_settings(
        &self,
        id: Uuid,
        patch: &TimerSettingsPatch,
    ) -> Result<Option<TimerSettings>, StoreError> {
        // `||` merges at the top level, which is all the timer document has.
        let row: Option<(Json<TimerSettings>,)> = sqlx::query_as(
            r#"
            UPDATE users
            SET timer_settings = timer_settings || $2::jsonb, updated_at = now()
            WHERE id = $1
            RETURNING timer_settings
            "#,
        )
        .bind(id)
        .bind(Json(patch))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(s,)| s.0))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
