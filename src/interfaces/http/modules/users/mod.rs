//! Users module: producer and pakhsh-manager accounts (admin CRUD)

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
