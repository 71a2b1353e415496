//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use chirp_core::{FeedService, FollowService, LikeService, ProfileService, TweetService};
use chirp_db::repositories::UserRepository;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub feed_service: FeedService,
    pub tweet_service: TweetService,
    pub like_service: LikeService,
    pub follow_service: FollowService,
    pub profile_service: ProfileService,
    pub user_repo: UserRepository,
}

/// Authentication middleware.
///
/// Session issuance lives in an external identity service; this side only
/// resolves the bearer token it handed out to a user row and stashes it in
/// the request extensions. Requests without a valid token pass through
/// anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
        && let Ok(Some(user)) = state.user_repo.find_by_token(token).await
    {
        tracing::debug!(user_id = %user.id, "Authenticated request");
        req.extensions_mut().insert(user);
    }

    next.run(req).await
}
