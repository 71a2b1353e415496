//! API endpoints.

mod profiles;
mod tweets;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/tweets", tweets::router())
        .nest("/profiles", profiles::router())
}
