//! Like repository.

use std::sync::Arc;

use crate::entities::{Like, like};
use chirp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, ModelTrait,
    PaginatorTrait, QueryFilter, QuerySelect, SqlErr,
};

/// Like count for a single tweet, from the grouped count query.
#[derive(Debug, Clone, FromQueryResult)]
pub struct TweetLikeCount {
    /// Tweet ID.
    pub tweet_id: String,
    /// Number of likes on it.
    pub like_count: i64,
}

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by user and tweet.
    pub async fn find_by_user_and_tweet(
        &self,
        user_id: &str,
        tweet_id: &str,
    ) -> AppResult<Option<like::Model>> {
        Like::find()
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::TweetId.eq(tweet_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked a tweet.
    pub async fn has_liked(&self, user_id: &str, tweet_id: &str) -> AppResult<bool> {
        Ok(self
            .find_by_user_and_tweet(user_id, tweet_id)
            .await?
            .is_some())
    }

    /// Create a new like.
    ///
    /// A violation of the unique `(user_id, tweet_id)` index maps to
    /// [`AppError::Conflict`] so callers can tell a lost toggle race apart
    /// from a genuine database failure.
    pub async fn create(&self, model: like::ActiveModel) -> AppResult<like::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                AppError::Conflict("Already liked".to_string())
            } else {
                AppError::Database(e.to_string())
            }
        })
    }

    /// Delete a like by user and tweet.
    pub async fn delete_by_user_and_tweet(&self, user_id: &str, tweet_id: &str) -> AppResult<()> {
        let like = self.find_by_user_and_tweet(user_id, tweet_id).await?;
        if let Some(l) = like {
            l.delete(self.db.as_ref())
                .await
                .map_err(|e| AppError::Database(e.to_string()))?;
        }
        Ok(())
    }

    /// Count likes on a tweet.
    pub async fn count_by_tweet(&self, tweet_id: &str) -> AppResult<u64> {
        Like::find()
            .filter(like::Column::TweetId.eq(tweet_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count likes grouped by tweet, for a batch of tweets.
    ///
    /// Tweets with no likes are absent from the result; callers default to
    /// zero.
    pub async fn count_by_tweets(&self, tweet_ids: &[String]) -> AppResult<Vec<TweetLikeCount>> {
        if tweet_ids.is_empty() {
            return Ok(vec![]);
        }

        Like::find()
            .select_only()
            .column(like::Column::TweetId)
            .column_as(like::Column::Id.count(), "like_count")
            .filter(like::Column::TweetId.is_in(tweet_ids.to_vec()))
            .group_by(like::Column::TweetId)
            .into_model::<TweetLikeCount>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Of the given tweets, the IDs the user has liked.
    pub async fn liked_tweet_ids(
        &self,
        user_id: &str,
        tweet_ids: &[String],
    ) -> AppResult<Vec<String>> {
        if tweet_ids.is_empty() {
            return Ok(vec![]);
        }

        Like::find()
            .select_only()
            .column(like::Column::TweetId)
            .filter(like::Column::UserId.eq(user_id))
            .filter(like::Column::TweetId.is_in(tweet_ids.to_vec()))
            .into_tuple::<String>()
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_like(id: &str, user_id: &str, tweet_id: &str) -> like::Model {
        like::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            tweet_id: tweet_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_has_liked_true() {
        let like = create_test_like("l1", "u1", "t1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[like]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.has_liked("u1", "t1").await.unwrap();

        assert!(result);
    }

    #[tokio::test]
    async fn test_has_liked_false() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<like::Model>::new()])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo.has_liked("u1", "t1").await.unwrap();

        assert!(!result);
    }

    #[tokio::test]
    async fn test_count_by_tweets_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = LikeRepository::new(db);
        let result = repo.count_by_tweets(&[]).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_count_by_tweets() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "tweet_id" => sea_orm::Value::String(Some(Box::new("t1".to_string()))),
                    "like_count" => sea_orm::Value::BigInt(Some(2))
                }]])
                .into_connection(),
        );

        let repo = LikeRepository::new(db);
        let result = repo
            .count_by_tweets(&["t1".to_string(), "t2".to_string()])
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].tweet_id, "t1");
        assert_eq!(result[0].like_count, 2);
    }

    #[tokio::test]
    async fn test_liked_tweet_ids_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = LikeRepository::new(db);
        let result = repo.liked_tweet_ids("u1", &[]).await.unwrap();

        assert!(result.is_empty());
    }
}
