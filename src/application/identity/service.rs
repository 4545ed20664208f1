//! User management service: application-layer orchestration
//!
//! Account CRUD for producers and pakhsh managers, password changes for
//! every role, and the first-run admin seed.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::domain::user::{validate_new_password, NewUser};
use crate::domain::{AccountRole, DomainError, DomainResult, Profile, RepositoryProvider, UserPatch, UserRecord};
use crate::infrastructure::crypto::{hash_password, verify_password};

pub struct UserService {
    repos: Arc<dyn RepositoryProvider>,
    bcrypt_cost: u32,
}

/// Admin accounts are seeded from configuration, not managed over the API.
fn ensure_managed(role: AccountRole) -> DomainResult<()> {
    if role == AccountRole::Admin {
        return Err(DomainError::Forbidden(
            "Admin accounts cannot be managed through this endpoint".into(),
        ));
    }
    Ok(())
}

impl UserService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, bcrypt_cost: u32) -> Self {
        Self { repos, bcrypt_cost }
    }

    // ── Queries ─────────────────────────────────────────────────

    pub async fn list(&self, role: AccountRole) -> DomainResult<Vec<Profile>> {
        ensure_managed(role)?;
        let users = self.repos.users(role).list().await?;
        Ok(users.iter().map(|u| u.profile(role)).collect())
    }

    pub async fn profile(&self, role: AccountRole, id: &str) -> DomainResult<Profile> {
        self.repos
            .users(role)
            .find_by_id(id)
            .await?
            .map(|u| u.profile(role))
            .ok_or_else(|| DomainError::not_found("User", id))
    }

    // ── Commands (mutations) ────────────────────────────────────

    pub async fn add(&self, role: AccountRole, user: NewUser) -> DomainResult<Profile> {
        ensure_managed(role)?;
        user.validate()?;

        let hash = hash_password(&user.password, self.bcrypt_cost)?;
        let record = UserRecord::new(Uuid::new_v4().to_string(), user, hash);
        let profile = record.profile(role);
        self.repos.users(role).insert(record).await?;

        info!(user_id = %profile.id, username = %profile.username, role = %role, "User added");
        Ok(profile)
    }

    /// Field-by-field update; an omitted password keeps the current one.
    pub async fn update(&self, role: AccountRole, id: &str, patch: UserPatch) -> DomainResult<Profile> {
        ensure_managed(role)?;
        patch.validate()?;

        let password_hash = match &patch.password {
            Some(password) => Some(hash_password(password, self.bcrypt_cost)?),
            None => None,
        };
        let updated = self
            .repos
            .users(role)
            .update(id, patch.into_update(password_hash))
            .await?;

        info!(user_id = %id, username = %updated.username, role = %role, "User updated");
        Ok(updated.profile(role))
    }

    pub async fn delete(&self, role: AccountRole, id: &str) -> DomainResult<()> {
        ensure_managed(role)?;
        self.repos.users(role).delete(id).await?;
        info!(user_id = %id, role = %role, "User deleted");
        Ok(())
    }

    /// Change the signed-in account's own password. Verifies the current one first.
    pub async fn change_password(
        &self,
        role: AccountRole,
        user_id: &str,
        current_password: &str,
        new_password: &str,
    ) -> DomainResult<()> {
        validate_new_password(new_password)?;

        let user = self
            .repos
            .users(role)
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("User", user_id))?;

        if !verify_password(current_password, &user.password_hash) {
            return Err(DomainError::AuthFailure);
        }

        let update = UserPatch::default().into_update(Some(hash_password(new_password, self.bcrypt_cost)?));
        self.repos.users(role).update(user_id, update).await?;

        info!(user_id, role = %role, "Password changed");
        Ok(())
    }

    /// Create the seed admin when the admin collection is empty.
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, seed: NewUser) -> DomainResult<bool> {
        let admins = self.repos.users(AccountRole::Admin);
        if !admins.list().await?.is_empty() {
            return Ok(false);
        }
        seed.validate()?;

        let hash = hash_password(&seed.password, self.bcrypt_cost)?;
        let record = UserRecord::new(Uuid::new_v4().to_string(), seed, hash);
        info!(username = %record.username, "Seeding default admin account");
        admins.insert(record).await?;
        Ok(true)
    }
}
