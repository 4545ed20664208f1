//! JSON-file implementation of RepositoryProvider

use std::path::Path;

use crate::domain::repositories::RepositoryProvider;
use crate::domain::reservation::ReservationRepository;
use crate::domain::user::{AccountRole, UserRepository};

use super::reservation_repository::JsonReservationRepository;
use super::user_repository::JsonUserRepository;

/// Unified repository provider backed by one JSON file per collection.
///
/// ```ignore
/// let repos = JsonRepositoryProvider::new("./data");
/// let all = repos.reservations().list_all().await?;
/// ```
pub struct JsonRepositoryProvider {
    reservations: JsonReservationRepository,
    admins: JsonUserRepository,
    pakhsh_managers: JsonUserRepository,
    producers: JsonUserRepository,
}

impl JsonRepositoryProvider {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        Self {
            reservations: JsonReservationRepository::new(dir.join("reservations.json")),
            admins: JsonUserRepository::new(dir.join("admins.json"), "admins"),
            pakhsh_managers: JsonUserRepository::new(
                dir.join("pakhsh-managers.json"),
                "pakhshManagers",
            ),
            producers: JsonUserRepository::new(dir.join("producers.json"), "producers"),
        }
    }
}

impl RepositoryProvider for JsonRepositoryProvider {
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
