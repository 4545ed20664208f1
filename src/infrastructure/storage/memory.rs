//! In-memory storage for development and testing

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::{
    ReservationMutation, ReservationRepository, ReservationRequest, ReservationStatus,
};
use crate::domain::user::{AccountRole, UserRecord, UserRepository, UserUpdate};
use crate::domain::{DomainError, DomainResult};

/// Reservations keyed by id; a status change holds the entry's shard lock.
#[derive(Default)]
pub struct InMemoryReservationRepository {
    reservations: DashMap<String, ReservationRequest>,
}

impl InMemoryReservationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn list_all(&self) -> DomainResult<Vec<ReservationRequest>> {
        let mut all: Vec<_> = self.reservations.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.submitted_at.cmp(&b.submitted_at).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ReservationRequest>> {
        Ok(self.reservations.get(id).map(|r| r.clone()))
    }

    async fn insert(&self, reservation: ReservationRequest) -> DomainResult<()> {
        if self.reservations.contains_key(&reservation.id) {
            return Err(DomainError::Internal(format!(
                "Reservation id {} already exists",
                reservation.id
            )));
        }
        self.reservations.insert(reservation.id.clone(), reservation);
        Ok(())
    }

    async fn modify(
        &self,
        id: &str,
        mutation: ReservationMutation,
    ) -> DomainResult<ReservationRequest> {
        let mut entry = self
            .reservations
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Reservation", id))?;
        let mut candidate = entry.clone();
        mutation(&mut candidate)?;
        *entry = candidate.clone();
        Ok(candidate)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.reservations
            .remove(id)
            .ok_or_else(|| DomainError::not_found("Reservation", id))?;
        Ok(())
    }

    async fn delete_all_with_status(&self, status: ReservationStatus) -> DomainResult<usize> {
        let ids: Vec<String> = self
            .reservations
            .iter()
            .filter(|e| e.status == status)
            .map(|e| e.key().clone())
            .collect();
        let removed = ids
            .iter()
            .filter(|id| self.reservations.remove_if(*id, |_, r| r.status == status).is_some())
            .count();
        Ok(removed)
    }
}

/// One role's accounts. Writers are serialized so the username check and the
/// write happen together.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: DashMap<String, UserRecord>,
    write_lock: Mutex<()>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn username_taken(&self, username: &str, except_id: Option<&str>) -> bool {
        self.users
            .iter()
            .any(|u| u.username == username && Some(u.id.as_str()) != except_id)
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> DomainResult<Vec<UserRecord>> {
        let mut all: Vec<_> = self.users.iter().map(|e| e.value().clone()).collect();
        all.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(all)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<UserRecord>> {
        Ok(self.users.get(id).map(|u| u.clone()))
    }

    async fn find_by_username(&self, username: &str) -> DomainResult<Option<UserRecord>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.value().clone()))
    }

    async fn insert(&self, user: UserRecord) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;
        if self.username_taken(&user.username, None) {
            return Err(DomainError::DuplicateUsername(user.username));
        }
        self.users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn update(&self, id: &str, update: UserUpdate) -> DomainResult<UserRecord> {
        let _guard = self.write_lock.lock().await;
        if let Some(username) = &update.username {
            if self.username_taken(username, Some(id)) {
                return Err(DomainError::DuplicateUsername(username.clone()));
            }
        }
        let mut user = self
            .users
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("User", id))?;
        user.apply(&update);
        Ok(user.clone())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let _guard = self.write_lock.lock().await;
        self.users
            .remove(id)
            .ok_or_else(|| DomainError::not_found("User", id))?;
        Ok(())
    }
}

/// In-memory [`RepositoryProvider`]
#[derive(Default)]
pub struct InMemoryRepositoryProvider {
    reservations: InMemoryReservationRepository,
    admins: InMemoryUserRepository,
    pakhsh_managers: InMemoryUserRepository,
    producers: InMemoryUserRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn users(&self, role: AccountRole) -> &dyn UserRepository {
        match role {
            AccountRole::Admin => &self.admins,
            AccountRole::PakhshManager => &self.pakhsh_managers,
            AccountRole::Producer => &self.producers,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::domain::reservation::model::tests::sample_request;
    use crate::domain::reservation::{apply_status_change, ActingRole, ServiceType};
    use crate::domain::user::model::tests::new_user;

    #[tokio::test]
    async fn delete_all_with_status_counts_removed() {
        let repo = InMemoryReservationRepository::new();
        for (i, status) in [
            ReservationStatus::Cancelled,
            ReservationStatus::Cancelled,
            ReservationStatus::Cancelled,
            ReservationStatus::Confirmed,
            ReservationStatus::Confirmed,
        ]
        .into_iter()
        .enumerate()
        {
            let mut r = sample_request(&format!("r-{}", i), ServiceType::WithCrew);
            r.status = status;
            repo.insert(r).await.unwrap();
        }

        assert_eq!(repo.delete_all_with_status(ReservationStatus::Cancelled).await.unwrap(), 3);
        let left = repo.list_all().await.unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|r| r.status == ReservationStatus::Confirmed));
    }

    #[tokio::test]
    async fn modify_unknown_id_is_not_found() {
        let repo = InMemoryReservationRepository::new();
        let result = repo
            .modify("nope", Box::new(|_: &mut ReservationRequest| Ok(())))
            .await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn concurrent_confirmations_keep_both_timestamps() {
        let repo = Arc::new(InMemoryReservationRepository::new());
        repo.insert(sample_request("r-1", ServiceType::WithCrew)).await.unwrap();

        let mut tasks = Vec::new();
        for (role, status) in [
            (ActingRole::Admin, ReservationStatus::AdminConfirmed),
            (ActingRole::Pakhsh, ReservationStatus::PakhshConfirmed),
        ] {
            let repo = repo.clone();
            tasks.push(tokio::spawn(async move {
                repo.modify(
                    "r-1",
                    Box::new(move |r: &mut ReservationRequest| {
                        apply_status_change(r, status, role, Utc::now())
                    }),
                )
                .await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored = repo.find_by_id("r-1").await.unwrap().unwrap();
        assert!(stored.admin_confirmed_at.is_some());
        assert!(stored.pakhsh_confirmed_at.is_some());
    }

    #[tokio::test]
    async fn role_collections_are_separate_namespaces() {
        let repos = InMemoryRepositoryProvider::new();
        repos
            .users(AccountRole::Producer)
            .insert(UserRecord::new("u-1", new_user("sam"), "h".into()))
            .await
            .unwrap();
        repos
            .users(AccountRole::PakhshManager)
            .insert(UserRecord::new("u-2", new_user("sam"), "h".into()))
            .await
            .unwrap();

        let err = repos
            .users(AccountRole::PakhshManager)
            .insert(UserRecord::new("u-3", new_user("sam"), "h".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateUsername(_)));
    }
}
