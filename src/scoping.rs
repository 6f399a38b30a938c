//! Owner-scoped access to per-user records.
//!
//! Every owned resource goes through [`Scoped`]: the owner always comes from
//! the authenticated request, lookups and mutations always filter on
//! `(id, owner)` together, and a foreign record is reported exactly like a
//! missing one.

use std::{cmp::Ordering, marker::PhantomData, sync::Arc};

use async_trait::async_trait;
use axum::{
    extract::{FromRef, Path, State},
    routing::get,
    Router,
};
use serde::{de::DeserializeOwned, Serialize};
use time::OffsetDateTime;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::{
    auth::extractors::AuthUser,
    error::{ApiError, AppJson, AppQuery},
    response::{ApiList, ApiSuccess},
    state::AppState,
    store::StoreError,
    validate::Checked,
};

/// A record type owned by exactly one user.
pub trait Resource: Serialize + Clone + Send + Sync + 'static {
    /// Create body. Carries no owner field.
    type Draft: DeserializeOwned + Send + 'static;
    /// Partial update body. `None` fields are left unchanged.
    type Patch: DeserializeOwned + Send + Sync + 'static;
    /// Caller-supplied list filters, always combined with the owner condition.
    type Filter: DeserializeOwned + Default + Send + Sync + 'static;

    /// Used in client messages, e.g. "Task not found".
    const LABEL: &'static str;

    fn id(&self) -> Uuid;
    fn owner_id(&self) -> Uuid;

    fn check_draft(draft: &Self::Draft) -> Checked;
    fn check_patch(patch: &Self::Patch) -> Checked;

    fn from_draft(id: Uuid, owner: Uuid, now: OffsetDateTime, draft: Self::Draft) -> Self;
    fn apply(&mut self, patch: &Self::Patch, now: OffsetDateTime);

    fn matches(&self, filter: &Self::Filter) -> bool;
    /// Listing order.
    fn order(a: &Self, b: &Self) -> Ordering;
    fn limit(_filter: &Self::Filter) -> Option<usize> {
        None
    }
}

/// Storage port for one resource type. Every method is scoped by `owner`.
#[async_trait]
pub trait OwnedStore<R: Resource>: Send + Sync {
    async fn list(&self, owner: Uuid, filter: &R::Filter) -> Result<Vec<R>, StoreError>;
    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<R>, StoreError>;
    async fn insert(&self, record: R) -> Result<R, StoreError>;
    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &R::Patch,
        now: OffsetDateTime,
    ) -> Result<Option<R>, StoreError>;
    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Option<R>, StoreError>;

    /// Deletes every record of `owner` and returns how many were removed.
    async fn clear(&self, owner: Uuid) -> Result<u64, StoreError> {
        let mut cleared = 0;
        for record in self.list(owner, &R::Filter::default()).await? {
            if self.delete(owner, record.id()).await?.is_some() {
                cleared += 1;
            }
        }
        Ok(cleared)
    }
}

pub struct Scoped<R: Resource> {
    store: Arc<dyn OwnedStore<R>>,
    _marker: PhantomData<fn() -> R>,
}

impl<R: Resource> Clone for Scoped<R> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _marker: PhantomData,
        }
    }
}

impl<R: Resource> Scoped<R> {
    pub fn new(store: Arc<dyn OwnedStore<R>>) -> Self {
        Self {
            store,
            _marker: PhantomData,
        }
    }

    /// Malformed ids can never match a row, so they read as absent.
    fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
        Uuid::parse_str(raw.trim()).map_err(|_| {
            debug!(resource = R::LABEL, "malformed id");
            ApiError::NotFound(R::LABEL)
        })
    }

    fn found(record: Option<R>, owner: Uuid, id: Uuid) -> Result<R, ApiError> {
        record.ok_or_else(|| {
            debug!(resource = R::LABEL, user_id = %owner, %id, "scoped lookup miss");
            ApiError::NotFound(R::LABEL)
        })
    }

    pub async fn list(&self, owner: Uuid, filter: &R::Filter) -> Result<Vec<R>, ApiError> {
        Ok(self.store.list(owner, filter).await?)
    }

    pub async fn get(&self, owner: Uuid, raw_id: &str) -> Result<R, ApiError> {
        let id = Self::parse_id(raw_id)?;
        let record = self.store.get(owner, id).await?;
        Self::found(record, owner, id)
    }

    pub async fn create(&self, owner: Uuid, draft: R::Draft) -> Result<R, ApiError> {
        R::check_draft(&draft)?;
        let record = R::from_draft(Uuid::new_v4(), owner, OffsetDateTime::now_utc(), draft);
        let saved = self.store.insert(record).await?;
        info!(resource = R::LABEL, user_id = %owner, id = %saved.id(), "created");
        Ok(saved)
    }

    /// Validates and applies a client patch.
    pub async fn update(&self, owner: Uuid, raw_id: &str, patch: R::Patch) -> Result<R, ApiError> {
        R::check_patch(&patch)?;
        self.apply(owner, raw_id, patch).await
    }

    /// Applies a server-built patch without client validation.
    pub async fn apply(&self, owner: Uuid, raw_id: &str, patch: R::Patch) -> Result<R, ApiError> {
        let id = Self::parse_id(raw_id)?;
        let record = self
            .store
            .update(owner, id, &patch, OffsetDateTime::now_utc())
            .await?;
        let record = Self::found(record, owner, id)?;
        info!(resource = R::LABEL, user_id = %owner, %id, "updated");
        Ok(record)
    }

    pub async fn delete(&self, owner: Uuid, raw_id: &str) -> Result<R, ApiError> {
        let id = Self::parse_id(raw_id)?;
        let record = self.store.delete(owner, id).await?;
        let record = Self::found(record, owner, id)?;
        info!(resource = R::LABEL, user_id = %owner, %id, "deleted");
        Ok(record)
    }

    /// Owner-wide delete; other owners' records are never touched.
    pub async fn clear(&self, owner: Uuid) -> Result<u64, ApiError> {
        let cleared = self.store.clear(owner).await?;
        info!(resource = R::LABEL, user_id = %owner, cleared, "cleared");
        Ok(cleared)
    }
}

/// `GET/POST /` and `GET/PUT/DELETE /:id` for a resource.
pub fn crud_routes<R>() -> Router<AppState>
where
    R: Resource,
    Scoped<R>: FromRef<AppState>,
{
    Router::new()
        .route("/", get(list::<R>).post(create::<R>))
        .route("/:id", get(read::<R>).put(update::<R>).delete(remove::<R>))
}

#[instrument(skip_all, fields(resource = R::LABEL, user_id = %user_id))]
pub async fn list<R: Resource>(
    State(scope): State<Scoped<R>>,
    AuthUser(user_id): AuthUser,
    AppQuery(filter): AppQuery<R::Filter>,
) -> Result<ApiList<R>, ApiError> {
    let items = scope.list(user_id, &filter).await?;
    Ok(ApiList::new(items))
}

#[instrument(skip_all, fields(resource = R::LABEL, user_id = %user_id, id = %id))]
pub async fn read<R: Resource>(
    State(scope): State<Scoped<R>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<ApiSuccess<R>, ApiError> {
    Ok(ApiSuccess::ok(scope.get(user_id, &id).await?))
}

#[instrument(skip_all, fields(resource = R::LABEL, user_id = %user_id))]
pub async fn create<R: Resource>(
    State(scope): State<Scoped<R>>,
    AuthUser(user_id): AuthUser,
    AppJson(draft): AppJson<R::Draft>,
) -> Result<ApiSuccess<R>, ApiError> {
    let record = scope.create(user_id, draft).await?;
    Ok(ApiSuccess::created(record).with_message(format!("{} created successfully", R::LABEL)))
}

#[instrument(skip_all, fields(resource = R::LABEL, user_id = %user_id, id = %id))]
pub async fn update<R: Resource>(
    State(scope): State<Scoped<R>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
    AppJson(patch): AppJson<R::Patch>,
) -> Result<ApiSuccess<R>, ApiError> {
    let record = scope.update(user_id, &id, patch).await?;
    Ok(ApiSuccess::ok(record).with_message(format!("{} updated successfully", R::LABEL)))
}

#[instrument(skip_all, fields(resource = R::LABEL, user_id = %user_id, id = %id))]
pub async fn remove<R: Resource>(
    State(scope): State<Scoped<R>>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<String>,
) -> Result<ApiSuccess<R>, ApiError> {
    let record = scope.delete(user_id, &id).await?;
    Ok(ApiSuccess::ok(record).with_message(format!("{} deleted successfully", R::LABEL)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryTable;
    use crate::tasks::{Task, TaskDraft, TaskFilter, TaskPatch, TaskStatus};

    fn scope() -> Scoped<Task> {
        Scoped::new(Arc::new(MemoryTable::<Task>::default()))
    }

    fn draft(title: &str) -> TaskDraft {
        TaskDraft {
            title: title.into(),
            ..TaskDraft::default()
        }
    }

    #[tokio::test]
    async fn create_takes_owner_from_caller() {
        let scope = scope();
        let owner = Uuid::new_v4();
        let task = scope.create(owner, draft("write report")).await.unwrap();
        assert_eq!(task.owner_id(), owner);
        assert_eq!(scope.get(owner, &task.id.to_string()).await.unwrap().id, task.id);
    }

    #[tokio::test]
    async fn foreign_record_reads_as_missing() {
        let scope = scope();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let task = scope.create(alice, draft("alice only")).await.unwrap();
        let id = task.id.to_string();

        let foreign = scope.get(bob, &id).await.unwrap_err();
        let missing = scope.get(bob, &Uuid::new_v4().to_string()).await.unwrap_err();
        assert_eq!(foreign.client_message(), missing.client_message());
        assert_eq!(foreign.status(), missing.status());
    }

    #[tokio::test]
    async fn foreign_update_and_delete_leave_record_untouched() {
        let scope = scope();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        let task = scope.create(alice, draft("keep me")).await.unwrap();
        let id = task.id.to_string();

        let patch = TaskPatch {
            status: Some(TaskStatus::Completed),
            ..TaskPatch::default()
        };
        assert!(matches!(
            scope.update(bob, &id, patch).await,
            Err(ApiError::NotFound("Task"))
        ));
        assert!(matches!(
            scope.delete(bob, &id).await,
            Err(ApiError::NotFound("Task"))
        ));

        let still = scope.get(alice, &id).await.unwrap();
        assert_eq!(still.status, TaskStatus::Todo);
    }

    #[tokio::test]
    async fn repeat_delete_is_not_found() {
        let scope = scope();
        let owner = Uuid::new_v4();
        let task = scope.create(owner, draft("once")).await.unwrap();
        let id = task.id.to_string();
        scope.delete(owner, &id).await.unwrap();
        assert!(matches!(
            scope.delete(owner, &id).await,
            Err(ApiError::NotFound("Task"))
        ));
    }

    #[tokio::test]
    async fn malformed_id_is_not_found() {
        let scope = scope();
        assert!(matches!(
            scope.get(Uuid::new_v4(), "not-a-uuid").await,
            Err(ApiError::NotFound("Task"))
        ));
    }

    #[tokio::test]
    async fn list_never_crosses_owners() {
        let scope = scope();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        scope.create(alice, draft("a1")).await.unwrap();
        scope.create(alice, draft("a2")).await.unwrap();
        scope.create(bob, draft("b1")).await.unwrap();

        let mine = scope.list(alice, &TaskFilter::default()).await.unwrap();
        assert_eq!(mine.len(), 2);
        assert!(mine.iter().all(|t| t.owner_id() == alice));
    }

    #[tokio::test]
    async fn clear_only_removes_callers_records() {
        let scope = scope();
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();
        scope.create(alice, draft("a1")).await.unwrap();
        scope.create(alice, draft("a2")).await.unwrap();
        scope.create(bob, draft("b1")).await.unwrap();

        assert_eq!(scope.clear(bob).await.unwrap(), 1);
        assert_eq!(scope.clear(bob).await.unwrap(), 0);
        let left = scope.list(alice, &TaskFilter::default()).await.unwrap();
        assert_eq!(left.len(), 2);
    }

    #[tokio::test]
    async fn invalid_draft_is_rejected_before_storage() {
        let scope = scope();
        let owner = Uuid::new_v4();
        let err = scope.create(owner, draft("   ")).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(scope
            .list(owner, &TaskFilter::default())
            .await
            .unwrap()
            .is_empty());
    }
}
