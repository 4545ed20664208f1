//! Reservations module: submission, dashboards and workflow decisions

pub mod dto;
pub mod handlers;

pub use dto::*;
pub use handlers::*;
