//! Tweet endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chirp_common::{AppResult, FeedCursor};
use chirp_core::{DEFAULT_PAGE_SIZE, FeedFilter, FeedPage, ToggleOutcome};
use chirp_db::entities::tweet;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

const fn default_limit() -> u64 {
    DEFAULT_PAGE_SIZE
}

const fn max_limit() -> u64 {
    100
}

/// Feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    #[serde(default)]
    pub only_following: bool,
    #[serde(default = "default_limit")]
    pub limit: u64,
    /// Opaque continuation token from a previous page. Malformed tokens
    /// restart the walk from the top instead of failing.
    pub cursor: Option<String>,
}

/// Profile feed request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileFeedRequest {
    pub user_id: String,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub cursor: Option<String>,
}

/// Create tweet request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTweetRequest {
    pub content: String,
}

/// Toggle like request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeRequest {
    pub tweet_id: String,
}

/// Tweet response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetResponse {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}

impl From<tweet::Model> for TweetResponse {
    fn from(tweet: tweet::Model) -> Self {
        Self {
            id: tweet.id,
            user_id: tweet.user_id,
            content: tweet.content,
            created_at: tweet.created_at.to_rfc3339(),
        }
    }
}

/// Toggle result response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleResponse {
    pub added: bool,
}

impl From<ToggleOutcome> for ToggleResponse {
    fn from(outcome: ToggleOutcome) -> Self {
        Self {
            added: outcome.added,
        }
    }
}

/// Get the feed (global, or following-only).
async fn feed(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<FeedRequest>,
) -> AppResult<ApiResponse<FeedPage>> {
    let limit = req.limit.min(max_limit());
    let cursor = req.cursor.as_deref().and_then(FeedCursor::decode);
    let filter = if req.only_following {
        FeedFilter::Following
    } else {
        FeedFilter::Global
    };

    let page = state
        .feed_service
        .fetch_page(user.as_ref().map(|u| u.id.as_str()), &filter, limit, cursor)
        .await?;

    Ok(ApiResponse::ok(page))
}

/// Get a single author's feed.
async fn profile_feed(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<ProfileFeedRequest>,
) -> AppResult<ApiResponse<FeedPage>> {
    let limit = req.limit.min(max_limit());
    let cursor = req.cursor.as_deref().and_then(FeedCursor::decode);
    let filter = FeedFilter::Author(req.user_id);

    let page = state
        .feed_service
        .fetch_page(user.as_ref().map(|u| u.id.as_str()), &filter, limit, cursor)
        .await?;

    Ok(ApiResponse::ok(page))
}

/// Create a new tweet.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTweetRequest>,
) -> AppResult<ApiResponse<TweetResponse>> {
    let tweet = state.tweet_service.create(&user.id, &req.content).await?;
    Ok(ApiResponse::ok(tweet.into()))
}

/// Toggle a like on a tweet.
async fn toggle_like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ToggleLikeRequest>,
) -> AppResult<ApiResponse<ToggleResponse>> {
    let outcome = state.like_service.toggle(&user.id, &req.tweet_id).await?;
    Ok(ApiResponse::ok(outcome.into()))
}

/// Create the tweets router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/feed", post(feed))
        .route("/profile-feed", post(profile_feed))
        .route("/create", post(create))
        .route("/toggle-like", post(toggle_like))
}
