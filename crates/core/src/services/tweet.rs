//! Tweet service.

use crate::services::revalidate::SharedInvalidator;
use chirp_common::{AppError, AppResult, IdGenerator};
use chirp_db::{
    entities::tweet,
    repositories::{TweetRepository, UserRepository},
};
use sea_orm::Set;

/// Tweet service for business logic.
#[derive(Clone)]
pub struct TweetService {
    tweet_repo: TweetRepository,
    user_repo: UserRepository,
    invalidator: Option<SharedInvalidator>,
    id_gen: IdGenerator,
}

impl TweetService {
    /// Create a new tweet service.
    #[must_use]
    pub fn new(tweet_repo: TweetRepository, user_repo: UserRepository) -> Self {
        Self {
            tweet_repo,
            user_repo,
            invalidator: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the page invalidator.
    pub fn set_invalidator(&mut self, invalidator: SharedInvalidator) {
        self.invalidator = Some(invalidator);
    }

    /// Create a tweet.
    ///
    /// Content is stored verbatim; the only server-side rule is that it
    /// must not be empty. The author's profile render is refreshed
    /// fire-and-forget (it shows a tweet count).
    pub async fn create(&self, user_id: &str, content: &str) -> AppResult<tweet::Model> {
        if content.is_empty() {
            return Err(AppError::Validation("Content must not be empty".to_string()));
        }

        // Author must exist
        self.user_repo.get_by_id(user_id).await?;

        let model = tweet::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            content: Set(content.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let tweet = self.tweet_repo.create(model).await?;

        if let Some(ref invalidator) = self.invalidator {
            if let Err(e) = invalidator.invalidate(&format!("/profile/{user_id}")).await {
                tracing::warn!(error = %e, user_id = %user_id, "Failed to revalidate profile page");
            }
        }

        Ok(tweet)
    }
}
