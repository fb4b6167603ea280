//! In-process user repository.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::domain::entities::{NewUser, UniqueField, User, UserField};
use crate::domain::repositories::{Availability, UserRepository};
use crate::error::AppError;

#[derive(Default)]
struct Store {
    users: BTreeMap<i64, User>,
    next_id: i64,
}

impl Store {
    fn holds(&self, field: UniqueField, value: &str, exclude_id: i64) -> bool {
        self.users
            .values()
            .any(|u| u.id != exclude_id && field.value_of(u) == value)
    }

    fn ensure_free(
        &self,
        field: UniqueField,
        value: &str,
        exclude_id: i64,
    ) -> Result<(), AppError> {
        if self.holds(field, value, exclude_id) {
            return Err(AppError::conflict(
                "Resource already exists",
                json!({ "field": field.column() }),
            ));
        }
        Ok(())
    }
}

/// User storage kept in memory, with the same uniqueness rules as the
/// `users` table. Used by integration tests and local tooling.
#[derive(Default)]
pub struct MemoryUserRepository {
    store: RwLock<Store>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.store.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn can_register(&self, user_name: &str, email: &str) -> Result<Availability, AppError> {
        let store = self.store.read().await;
        Ok(Availability {
            user_name_free: !store.holds(UniqueField::UserName, user_name, 0),
            email_free: !store.holds(UniqueField::Email, email, 0),
        })
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<User>, AppError> {
        let field = if login.contains('@') {
            UniqueField::Email
        } else {
            UniqueField::UserName
        };
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .find(|u| field.value_of(u) == login)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        Ok(self.store.read().await.users.get(&id).cloned())
    }

    async fn exists_excluding(
        &self,
        field: UniqueField,
        value: &str,
        exclude_id: i64,
    ) -> Result<bool, AppError> {
        Ok(self.store.read().await.holds(field, value, exclude_id))
    }

    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut store = self.store.write().await;

        store.ensure_free(UniqueField::UserName, &new_user.user_name, 0)?;
        store.ensure_free(UniqueField::Email, &new_user.email, 0)?;

        store.next_id += 1;
        let user = User::from_new(store.next_id, new_user);
        store.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn update(&self, user: &User, fields: &[UserField]) -> Result<(), AppError> {
        let mut store = self.store.write().await;
        if !store.users.contains_key(&user.id) {
            return Err(AppError::not_found("User not found", json!({ "id": user.id })));
        }

        for field in fields {
            let unique = match field {
                UserField::UserName => UniqueField::UserName,
                UserField::Email => UniqueField::Email,
                _ => continue,
            };
            store.ensure_free(unique, unique.value_of(user), user.id)?;
        }

        let Some(stored) = store.users.get_mut(&user.id) else {
            return Err(AppError::not_found("User not found", json!({ "id": user.id })));
        };

        for field in fields {
            field.copy(user, stored);
        }
        stored.updated = Utc::now();
        Ok(())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<User>, AppError> {
        let store = self.store.read().await;
        Ok(store
            .users
            .values()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}
