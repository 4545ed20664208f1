//! JSON-file implementation of UserRepository

use std::path::PathBuf;

use async_trait::async_trait;

use super::collection::JsonCollection;
use crate::domain::user::{UserRecord, UserRepository, UserUpdate};
use crate::domain::{DomainError, DomainResult};

/// One role's accounts, stored as `{"<key>": [...]}`
pub struct JsonUserRepository {
    collection: JsonCollection<UserRecord>,
}

impl JsonUserRepository {
    pub fn new(path: impl Into<PathBuf>, key: &'static str) -> Self {
        Self {
            collection: JsonCollection::new(path, key),
        }
    }
}

fn username_taken(all: &[UserRecord], username: &str, except_id: Option<&str>) -> bool {
    all.iter()
        .any(|u| u.username == username && Some(u.id.as_str()) != except_id)
}

#[async_trait]
impl UserRepository for JsonUserRepository {
    async fn list(&self) -> DomainResult<Vec<UserRecord>> {
        self.collection.read().await
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<UserRecord>> {
        let all = self.collection.read().await?;
        Ok(all.into_iter().find(|u| u.id == id))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<UserRecord>> {
        let all = self.collection.read().await?;
        Ok(all.into_iter().find(|u| u.username == username))
    }

    async fn insert(&self, user: UserRecord) -> DomainResult<()> {
        self.collection
            .update(move |all| {
                if username_taken(all, &user.username, None) {
                    return Err(DomainError::DuplicateUsername(user.username));
                }
                all.push(user);
                Ok(())
            })
            .await
    }

    async fn update(&self, id: &str, update: UserUpdate) -> DomainResult<UserRecord> {
        self.collection
            .update(move |all| {
                if let Some(username) = &update.username {
                    if username_taken(all, username, Some(id)) {
                        return Err(DomainError::DuplicateUsername(username.clone()));
                    }
                }
                let user = all
                    .iter_mut()
                    .find(|u| u.id == id)
                    .ok_or_else(|| DomainError::not_found("User", id))?;
                user.apply(&update);
                Ok(user.clone())
            })
            .await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.collection
            .update(|all| {
                let before = all.len();
                all.retain(|u| u.id != id);
                if all.len() == before {
                    return Err(DomainError::not_found("User", id));
                }
                Ok(())
            })
            .await
    }
}
