//! HTTP API layer for chirp.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: feed queries and toggle mutations
//! - **Extractors**: authentication
//! - **Middleware**: bearer-token resolution
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
