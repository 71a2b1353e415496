//! Like service.

use chirp_common::{AppError, AppResult, IdGenerator};
use chirp_db::{
    entities::like,
    repositories::{LikeRepository, TweetRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Result of a toggle mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    /// `true` if the edge was created, `false` if it was removed.
    pub added: bool,
}

/// Like service for business logic.
#[derive(Clone)]
pub struct LikeService {
    like_repo: LikeRepository,
    tweet_repo: TweetRepository,
    id_gen: IdGenerator,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub fn new(like_repo: LikeRepository, tweet_repo: TweetRepository) -> Self {
        Self {
            like_repo,
            tweet_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Toggle a like: remove it if present, create it otherwise.
    ///
    /// Concurrent duplicate toggles from the same user race on the create;
    /// the unique `(user_id, tweet_id)` index arbitrates. A loser re-checks
    /// the edge and reports the state the store settled on, so the conflict
    /// never reaches the caller.
    pub async fn toggle(&self, user_id: &str, tweet_id: &str) -> AppResult<ToggleOutcome> {
        // 404 before touching edge state
        self.tweet_repo.get_by_id(tweet_id).await?;

        if self.like_repo.has_liked(user_id, tweet_id).await? {
            self.like_repo
                .delete_by_user_and_tweet(user_id, tweet_id)
                .await?;
            return Ok(ToggleOutcome { added: false });
        }

        let model = like::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            tweet_id: Set(tweet_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        match self.like_repo.create(model).await {
            Ok(_) => Ok(ToggleOutcome { added: true }),
            Err(AppError::Conflict(_)) => {
                let added = self.like_repo.has_liked(user_id, tweet_id).await?;
                tracing::debug!(
                    user_id = %user_id,
                    tweet_id = %tweet_id,
                    added = added,
                    "Like toggle raced, resolved from store"
                );
                Ok(ToggleOutcome { added })
            }
            Err(e) => Err(e),
        }
    }
}
