use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    scoping::{OwnedStore, Resource},
    store::StoreError,
    users::{NewUser, Settings, TimerSettings, TimerSettingsPatch, User, UserStore},
};

/// One resource table kept in process. The owner check and the mutation
/// happen under the same write guard.
pub struct MemoryTable<R> {
    rows: RwLock<HashMap<Uuid, R>>,
}

impl<R> Default for MemoryTable<R> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }
}

#[async_trait]
impl<R: Resource> OwnedStore<R> for MemoryTable<R> {
    async fn list(&self, owner: Uuid, filter: &R::Filter) -> Result<Vec<R>, StoreError> {
        let rows = self.rows.read().await;
        let mut out: Vec<R> = rows
            .values()
            .filter(|r| r.owner_id() == owner && r.matches(filter))
            .cloned()
            .collect();
        out.sort_by(R::order);
        if let Some(limit) = R::limit(filter) {
            out.truncate(limit);
        }
        Ok(out)
    }

    async fn get(&self, owner: Uuid, id: Uuid) -> Result<Option<R>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.get(&id).filter(|r| r.owner_id() == owner).cloned())
    }

    async fn insert(&self, record: R) -> Result<R, StoreError> {
        let mut rows = self.rows.write().await;
        if rows.contains_key(&record.id()) {
            return Err(StoreError::Duplicate);
        }
        rows.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        owner: Uuid,
        id: Uuid,
        patch: &R::Patch,
        now: OffsetDateTime,
    ) -> Result<Option<R>, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(record) if record.owner_id() == owner => {
                record.apply(patch, now);
                Ok(Some(record.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, owner: Uuid, id: Uuid) -> Result<Option<R>, StoreError> {
        let mut rows = self.rows.write().await;
        let owned = rows.get(&id).is_some_and(|r| r.owner_id() == owner);
        if owned {
            Ok(rows.remove(&id))
        } else {
            Ok(None)
        }
    }
}

#[derive(Default)]
pub struct MemoryUsers {
    rows: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl UserStore for MemoryUsers {
    async fn create(&self, new: NewUser) -> Result<User, StoreError> {
        let mut rows = self.rows.write().await;
        let taken = rows.values().any(|u| {
            u.email == new.email || u.username.to_lowercase() == new.username.to_lowercase()
        });
        if taken || rows.contains_key(&new.id) {
            return Err(StoreError::Duplicate);
        }
        let user = User::from(new);
        rows.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let rows = self.rows.read().await;
        Ok(rows.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn update_password(&self, id: Uuid, password_hash: &str) -> Result<bool, StoreError> {
        let mut rows = self.rows.write().await;
        match rows.get_mut(&id) {
            Some(user) => {
                user.password_hash = password_hash.to_string();
                user.updated_at = OffsetDateTime::now_utc();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn replace_settings(
        &self,
        id: Uuid,
        settings: &Settings,
    ) -> Result<Option<Settings>, StoreError> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(&id).map(|user| {
            user.settings = settings.clone();
            user.updated_at = OffsetDateTime::now_utc();
            user.settings.clone()
        }))
    }

    async fn set_dark_mode(&self, id: Uuid, dark_mode: bool) -> Result<Option<bool>, StoreError> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(&id).map(|user| {
            user.settings.dark_mode = dark_mode;
            user.updated_at = OffsetDateTime::now_utc();
            dark_mode
        }))
    }

    async fn merge_timer_settings(
        &self,
        id: Uuid,
        patch: &TimerSettingsPatch,
    ) -> Result<Option<TimerSettings>, StoreError> {
        let mut rows = self.rows.write().await;
        Ok(rows.get_mut(&id).map(|user| {
            user.timer_settings.merge(patch);
            user.updated_at = OffsetDateTime::now_utc();
            user.timer_settings.clone()
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
