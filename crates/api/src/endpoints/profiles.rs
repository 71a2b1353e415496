//! Profile endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chirp_common::AppResult;
use chirp_core::Profile;
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

use super::tweets::ToggleResponse;

/// Profile request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    pub user_id: String,
}

/// Toggle follow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFollowRequest {
    pub user_id: String,
}

/// Get a user's profile summary.
async fn show(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProfileRequest>,
) -> AppResult<ApiResponse<Profile>> {
    let profile = state
        .profile_service
        .get(&req.user_id, user.as_ref().map(|u| u.id.as_str()))
        .await?;

    Ok(ApiResponse::ok(profile))
}

/// Toggle a follow on a user.
async fn toggle_follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleFollowRequest>,
) -> AppResult<ApiResponse<ToggleResponse>> {
    let outcome = state.follow_service.toggle(&user.id, &req.user_id).await?;
    Ok(ApiResponse::ok(outcome.into()))
}

/// Create the profiles router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/show", post(show))
        .route("/toggle-follow", post(toggle_follow))
}
