//! JSON-file persistence, one document per collection

mod collection;
mod repository_provider;
mod reservation_repository;
mod user_repository;

pub use collection::JsonCollection;
pub use repository_provider::JsonRepositoryProvider;
pub use reservation_repository::JsonReservationRepository;
pub use user_repository::JsonUserRepository;
