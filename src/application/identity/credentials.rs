//! Credential stores and the ordered authenticator
//!
//! Each role's account collection answers `verify` with the matching
//! profile or `None`. The authenticator asks them in order and the first
//! match wins.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::{AccountRole, DomainError, DomainResult, Profile, RepositoryProvider};
use crate::infrastructure::crypto::verify_password;

#[async_trait]
pub trait CredentialStore: Send + Sync {
    fn role(&self) -> AccountRole;

    /// Profile of the account when `password` matches, `None` otherwise
    async fn verify(&self, username: &str, password: &str) -> DomainResult<Option<Profile>>;
}

/// Credential store over one role's account collection
pub struct AccountStore {
    role: AccountRole,
    repos: Arc<dyn RepositoryProvider>,
}

impl AccountStore {
    pub fn new(role: AccountRole, repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { role, repos }
    }
}

#[async_trait]
impl CredentialStore for AccountStore {
    fn role(&self) -> AccountRole {
        self.role
    }

    async fn verify(&self, username: &str, password: &str) -> DomainResult<Option<Profile>> {
        let Some(user) = self.repos.users(self.role).find_by_username(username).await? else {
            return Ok(None);
        };
        if !verify_password(password, &user.password_hash) {
            return Ok(None);
        }
        Ok(Some(user.profile(self.role)))
    }
}

pub struct Authenticator {
    stores: Vec<Box<dyn CredentialStore>>,
}

impl Authenticator {
    pub fn new(stores: Vec<Box<dyn CredentialStore>>) -> Self {
        Self { stores }
    }

    /// Admin, then pakhsh manager, then producer.
    pub fn standard(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self::new(
            [
                AccountRole::Admin,
                AccountRole::PakhshManager,
                AccountRole::Producer,
            ]
            .into_iter()
            .map(|role| Box::new(AccountStore::new(role, repos.clone())) as Box<dyn CredentialStore>)
            .collect(),
        )
    }

    pub async fn authenticate(&self, username: &str, password: &str) -> DomainResult<Profile> {
        let username = username.trim();
        if username.is_empty() || password.is_empty() {
            return Err(DomainError::AuthFailure);
        }

        for store in &self.stores {
            if let Some(profile) = store.verify(username, password).await? {
                info!(username, role = %store.role(), "Login succeeded");
                return Ok(profile);
            }
        }

        warn!(username, "Login failed");
        Err(DomainError::AuthFailure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::model::tests::new_user;
    use crate::domain::UserRecord;
    use crate::infrastructure::crypto::{hash_password, password::MIN_COST};
    use crate::infrastructure::storage::InMemoryRepositoryProvider;

    async fn seed(repos: &InMemoryRepositoryProvider, role: AccountRole, id: &str, password: &str) {
        let hash = hash_password(password, MIN_COST).unwrap();
        repos
            .users(role)
            .insert(UserRecord::new(id, new_user("sam"), hash))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn admin_store_is_asked_first() {
        let repos = InMemoryRepositoryProvider::new();
        seed(&repos, AccountRole::Producer, "p-1", "secret1").await;
        seed(&repos, AccountRole::Admin, "a-1", "secret1").await;
        let auth = Authenticator::standard(Arc::new(repos));

        let profile = auth.authenticate("sam", "secret1").await.unwrap();
        assert_eq!(profile.role, AccountRole::Admin);
        assert_eq!(profile.id, "a-1");
    }

    #[tokio::test]
    async fn falls_through_to_the_store_whose_password_matches() {
        let repos = InMemoryRepositoryProvider::new();
        seed(&repos, AccountRole::PakhshManager, "m-1", "other-pass").await;
        seed(&repos, AccountRole::Producer, "p-1", "secret1").await;
        let auth = Authenticator::standard(Arc::new(repos));

        let profile = auth.authenticate("sam", "secret1").await.unwrap();
        assert_eq!(profile.role, AccountRole::Producer);
    }

    #[tokio::test]
    async fn no_match_is_auth_failure() {
        let repos = InMemoryRepositoryProvider::new();
        seed(&repos, AccountRole::Producer, "p-1", "secret1").await;
        let auth = Authenticator::standard(Arc::new(repos));

        assert!(matches!(
            auth.authenticate("sam", "wrong").await,
            Err(DomainError::AuthFailure)
        ));
        assert!(matches!(
            auth.authenticate("nobody", "secret1").await,
            Err(DomainError::AuthFailure)
        ));
    }
}
