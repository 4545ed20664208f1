//! JSON-file implementation of ReservationRepository

use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use super::collection::JsonCollection;
use crate::domain::reservation::{
    ReservationMutation, ReservationRepository, ReservationRequest, ReservationStatus,
};
use crate::domain::{DomainError, DomainResult};

pub struct JsonReservationRepository {
    collection: JsonCollection<ReservationRequest>,
}

impl JsonReservationRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            collection: JsonCollection::new(path, "reservations"),
        }
    }
}

#[async_trait]
impl ReservationRepository for JsonReservationRepository {
    async fn list_all(&self) -> DomainResult<Vec<ReservationRequest>> {
        self.collection.read().await
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ReservationRequest>> {
        let all = self.collection.read().await?;
        Ok(all.into_iter().find(|r| r.id == id))
    }

    async fn insert(&self, reservation: ReservationRequest) -> DomainResult<()> {
        debug!(reservation_id = %reservation.id, "Saving reservation");
        self.collection
            .update(move |all| {
                if all.iter().any(|r| r.id == reservation.id) {
                    return Err(DomainError::Internal(format!(
                        "Reservation id {} already exists",
                        reservation.id
                    )));
                }
                all.push(reservation);
                Ok(())
            })
            .await
    }

    async fn modify(
        &self,
        id: &str,
        mutation: ReservationMutation,
    ) -> DomainResult<ReservationRequest> {
        self.collection
            .update(move |all| {
                let slot = all
                    .iter_mut()
                    .find(|r| r.id == id)
                    .ok_or_else(|| DomainError::not_found("Reservation", id))?;
                let mut candidate = slot.clone();
                mutation(&mut candidate)?;
                *slot = candidate.clone();
                Ok(candidate)
            })
            .await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.collection
            .update(|all| {
                let before = all.len();
                all.retain(|r| r.id != id);
                if all.len() == before {
                    return Err(DomainError::not_found("Reservation", id));
                }
                Ok(())
            })
            .await
    }

    async fn delete_all_with_status(&self, status: ReservationStatus) -> DomainResult<usize> {
        self.collection
            .update(|all| {
                let before = all.len();
                all.retain(|r| r.status != status);
                Ok(before - all.len())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::domain::reservation::model::tests::sample_request;
    use crate::domain::reservation::{apply_status_change, ActingRole, ServiceType};

    fn repo(dir: &tempfile::TempDir) -> JsonReservationRepository {
        JsonReservationRepository::new(dir.path().join("reservations.json"))
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found_and_keeps_store() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        repo.insert(sample_request("r-1", ServiceType::WithCrew)).await.unwrap();

        let err = repo.delete("missing").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
        assert_eq!(repo.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn delete_all_cancelled_spares_confirmed() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        for (i, status) in [
            ReservationStatus::Cancelled,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
        ]
        .into_iter()
        .enumerate()
        {
            let mut r = sample_request(&format!("r-{}", i), ServiceType::WithoutCrew);
            r.status = status;
            repo.insert(r).await.unwrap();
        }

        assert_eq!(repo.delete_all_with_status(ReservationStatus::Cancelled).await.unwrap(), 3);
        let left = repo.list_all().await.unwrap();
        assert_eq!(left.len(), 2);
        assert!(left.iter().all(|r| r.status == ReservationStatus::Confirmed));
    }

    #[tokio::test]
    async fn failed_mutation_leaves_record_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        repo.insert(sample_request("r-1", ServiceType::WithCrew)).await.unwrap();

        let result = repo
            .modify(
                "r-1",
                Box::new(|r: &mut ReservationRequest| {
                    r.status = ReservationStatus::Read;
                    Err(DomainError::Validation("rejected".into()))
                }),
            )
            .await;
        assert!(result.is_err());
        let stored = repo.find_by_id("r-1").await.unwrap().unwrap();
        assert_eq!(stored.status, ReservationStatus::New);
    }

    #[tokio::test]
    async fn concurrent_confirmations_keep_both_timestamps() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(repo(&dir));
        repo.insert(sample_request("r-1", ServiceType::WithCrew)).await.unwrap();

        let confirm = |role: ActingRole, status: ReservationStatus| {
            let repo = repo.clone();
            tokio::spawn(async move {
                repo.modify(
                    "r-1",
                    Box::new(move |r: &mut ReservationRequest| {
                        apply_status_change(r, status, role, Utc::now())
                    }),
                )
                .await
            })
        };
        let admin = confirm(ActingRole::Admin, ReservationStatus::AdminConfirmed);
        let pakhsh = confirm(ActingRole::Pakhsh, ReservationStatus::PakhshConfirmed);
        admin.await.unwrap().unwrap();
        pakhsh.await.unwrap().unwrap();

        let stored = repo.find_by_id("r-1").await.unwrap().unwrap();
        assert!(stored.admin_confirmed_at.is_some());
        assert!(stored.pakhsh_confirmed_at.is_some());
    }

    #[tokio::test]
    async fn records_survive_a_reopen() {
        let dir = tempfile::tempdir().unwrap();
        repo(&dir)
            .insert(sample_request("r-1", ServiceType::WithCrew))
            .await
            .unwrap();

        let reopened = repo(&dir);
        assert_eq!(reopened.list_all().await.unwrap()[0].id, "r-1");
    }
}
