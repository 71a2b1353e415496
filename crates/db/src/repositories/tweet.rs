//! Tweet repository.

use std::sync::Arc;

use crate::entities::{Tweet, tweet};
use chirp_common::{AppError, AppResult, FeedCursor};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Tweet repository for database operations.
#[derive(Clone)]
pub struct TweetRepository {
    db: Arc<DatabaseConnection>,
}

impl TweetRepository {
    /// Create a new tweet repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tweet by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tweet::Model>> {
        Tweet::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a tweet by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<tweet::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::TweetNotFound(id.to_string()))
    }

    /// Create a new tweet.
    pub async fn create(&self, model: tweet::ActiveModel) -> AppResult<tweet::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count tweets by a user.
    pub async fn count_by_user(&self, user_id: &str) -> AppResult<u64> {
        Tweet::find()
            .filter(tweet::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the global feed (all tweets, newest first).
    ///
    /// Rows are ordered by `(created_at DESC, id DESC)` and start at the
    /// cursor position when given. Callers fetch one row beyond the page
    /// size to detect a continuation.
    pub async fn find_feed(
        &self,
        limit: u64,
        cursor: Option<&FeedCursor>,
    ) -> AppResult<Vec<tweet::Model>> {
        let mut condition = Condition::all();

        if let Some(cursor) = cursor {
            condition = condition.add(Self::after_cursor(cursor));
        }

        Tweet::find()
            .filter(condition)
            .order_by_desc(tweet::Column::CreatedAt)
            .order_by_desc(tweet::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get the feed restricted to a set of authors (newest first).
    ///
    /// Backs the following-only feed: the caller resolves the viewer's
    /// followee set and passes it here.
    pub async fn find_feed_by_authors(
        &self,
        author_ids: &[String],
        limit: u64,
        cursor: Option<&FeedCursor>,
    ) -> AppResult<Vec<tweet::Model>> {
        if author_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut condition =
            Condition::all().add(tweet::Column::UserId.is_in(author_ids.to_vec()));

        if let Some(cursor) = cursor {
            condition = condition.add(Self::after_cursor(cursor));
        }

        Tweet::find()
            .filter(condition)
            .order_by_desc(tweet::Column::CreatedAt)
            .order_by_desc(tweet::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get tweets by a single author (newest first).
    pub async fn find_feed_by_author(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&FeedCursor>,
    ) -> AppResult<Vec<tweet::Model>> {
        let mut condition = Condition::all().add(tweet::Column::UserId.eq(user_id));

        if let Some(cursor) = cursor {
            condition = condition.add(Self::after_cursor(cursor));
        }

        Tweet::find()
            .filter(condition)
            .order_by_desc(tweet::Column::CreatedAt)
            .order_by_desc(tweet::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Keyset predicate: rows at or after the cursor position in
    /// `(created_at DESC, id DESC)` order.
    ///
    /// Inclusive on the cursor row itself: a page's continuation cursor
    /// points at the first row the client has not seen (the row dropped
    /// from the previous over-fetch), so that row must open the next page.
    fn after_cursor(cursor: &FeedCursor) -> Condition {
        Condition::any()
            .add(tweet::Column::CreatedAt.lt(cursor.created_at))
            .add(
                Condition::all()
                    .add(tweet::Column::CreatedAt.eq(cursor.created_at))
                    .add(tweet::Column::Id.lte(cursor.id.as_str())),
            )
    }
}
