use async_trait::async_trait;

use super::{UserRecord, UserUpdate};
use crate::domain::DomainResult;

/// One role's credential collection. Usernames are unique within it.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> DomainResult<Vec<UserRecord>>;
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<UserRecord>>;
    async fn find_by_username(&self, username: &str) -> DomainResult<Option<UserRecord>>;

    /// `DuplicateUsername` when the username is taken
    async fn insert(&self, user: UserRecord) -> DomainResult<()>;

    /// `NotFound` for an unknown id, `DuplicateUsername` on a rename collision
    async fn update(&self, id: &str, update: UserUpdate) -> DomainResult<UserRecord>;

    async fn delete(&self, id: &str) -> DomainResult<()>;
}
