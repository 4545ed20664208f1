//! User aggregate
//!
//! Contains the account record, role, profile, patches and repository interface.

pub mod model;
pub mod repository;

pub use model::{
    validate_new_password, AccountRole, NewUser, Profile, UserPatch, UserRecord, UserUpdate,
};
pub use repository::UserRepository;
