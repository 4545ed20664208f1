//! HTTP REST API interfaces
//!
//! - `common`: response envelopes, pagination, validated JSON, error mapping
//! - `middleware`: session cookie / bearer token resolution and role gates
//! - `modules`: handlers and DTOs per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, AppState};
