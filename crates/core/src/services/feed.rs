//! Feed service.
//!
//! Builds cursor-paginated tweet listings with per-viewer annotations. All
//! three feed variants (global, following-only, single author) share the
//! same page assembly: over-fetch by one row, pop the extra row into the
//! continuation cursor, then annotate the page with like counts and the
//! viewer's own likes.

use std::collections::{HashMap, HashSet};

use chirp_common::{AppResult, FeedCursor};
use chirp_db::{
    entities::tweet,
    repositories::{FollowRepository, LikeRepository, TweetRepository, UserRepository},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Page size when the client does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Which slice of the tweet stream a feed query covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeedFilter {
    /// Every tweet.
    Global,
    /// Tweets whose author the viewer follows.
    Following,
    /// Tweets by one author.
    Author(String),
}

/// Author snippet embedded in each feed tweet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSnippet {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// A tweet as it appears in a feed, annotated for the requesting viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedTweet {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    /// Total likes, computed per request.
    pub like_count: i64,
    /// Whether the requesting viewer likes this tweet. Always `false` for
    /// anonymous viewers.
    pub liked_by_me: bool,
    pub user: UserSnippet,
}

/// One page of a feed walk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub tweets: Vec<FeedTweet>,
    /// Opaque continuation token; present iff more rows exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// Feed service for building paginated, annotated tweet listings.
#[derive(Clone)]
pub struct FeedService {
    tweet_repo: TweetRepository,
    like_repo: LikeRepository,
    follow_repo: FollowRepository,
    user_repo: UserRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(
        tweet_repo: TweetRepository,
        like_repo: LikeRepository,
        follow_repo: FollowRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            tweet_repo,
            like_repo,
            follow_repo,
            user_repo,
        }
    }

    /// Fetch one page of a feed.
    ///
    /// `cursor` resumes a walk from a previous page's `next_cursor`. The
    /// cursor is a `(created_at, id)` total-order key, so a forward walk
    /// neither duplicates nor skips tweets even while new tweets are being
    /// inserted.
    pub async fn fetch_page(
        &self,
        viewer_id: Option<&str>,
        filter: &FeedFilter,
        limit: u64,
        cursor: Option<FeedCursor>,
    ) -> AppResult<FeedPage> {
        let limit = limit.max(1);

        let rows = match filter {
            FeedFilter::Global => self.tweet_repo.find_feed(limit + 1, cursor.as_ref()).await?,
            FeedFilter::Following => {
                // Anonymous viewers follow nobody: empty page, no cursor.
                let Some(viewer_id) = viewer_id else {
                    return Ok(FeedPage::default());
                };
                let followees = self.follow_repo.followee_ids(viewer_id).await?;
                self.tweet_repo
                    .find_feed_by_authors(&followees, limit + 1, cursor.as_ref())
                    .await?
            }
            FeedFilter::Author(user_id) => {
                self.tweet_repo
                    .find_feed_by_author(user_id, limit + 1, cursor.as_ref())
                    .await?
            }
        };

        self.assemble(viewer_id, rows, limit).await
    }

    /// Turn raw rows into an annotated page.
    async fn assemble(
        &self,
        viewer_id: Option<&str>,
        mut rows: Vec<tweet::Model>,
        limit: u64,
    ) -> AppResult<FeedPage> {
        // The over-fetched row marks where the next page starts.
        let next_cursor = if rows.len() as u64 > limit {
            rows.pop().map(|extra| {
                FeedCursor::new(extra.created_at.with_timezone(&Utc), extra.id).encode()
            })
        } else {
            None
        };

        let tweet_ids: Vec<String> = rows.iter().map(|t| t.id.clone()).collect();

        let like_counts: HashMap<String, i64> = self
            .like_repo
            .count_by_tweets(&tweet_ids)
            .await?
            .into_iter()
            .map(|c| (c.tweet_id, c.like_count))
            .collect();

        let liked: HashSet<String> = match viewer_id {
            Some(viewer_id) => self
                .like_repo
                .liked_tweet_ids(viewer_id, &tweet_ids)
                .await?
                .into_iter()
                .collect(),
            None => HashSet::new(),
        };

        let author_ids: Vec<String> = rows
            .iter()
            .map(|t| t.user_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors: HashMap<String, UserSnippet> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id.clone(),
                    UserSnippet {
                        id: u.id,
                        name: u.name,
                        image: u.avatar_url,
                    },
                )
            })
            .collect();

        let tweets = rows
            .into_iter()
            .map(|t| {
                let user = authors.get(&t.user_id).cloned().unwrap_or(UserSnippet {
                    id: t.user_id.clone(),
                    name: None,
                    image: None,
                });
                FeedTweet {
                    liked_by_me: liked.contains(&t.id),
                    like_count: like_counts.get(&t.id).copied().unwrap_or(0),
                    id: t.id,
                    content: t.content,
                    created_at: t.created_at.with_timezone(&Utc),
                    user,
                }
            })
            .collect();

        Ok(FeedPage {
            tweets,
            next_cursor,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chirp_db::entities::user;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_tweet(id: &str, user_id: &str, secs: i64) -> tweet::Model {
        tweet::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            content: format!("tweet {id}"),
            created_at: Utc.timestamp_opt(1_748_736_000 + secs, 0).unwrap().into(),
        }
    }

    fn create_test_user(id: &str, name: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: name.to_string(),
            name: Some(name.to_string()),
            avatar_url: Some(format!("https://cdn.example/{id}.png")),
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn service_with(
        tweet_db: MockDatabase,
        like_db: MockDatabase,
        follow_db: MockDatabase,
        user_db: MockDatabase,
    ) -> FeedService {
        FeedService::new(
            TweetRepository::new(Arc::new(tweet_db.into_connection())),
            LikeRepository::new(Arc::new(like_db.into_connection())),
            FollowRepository::new(Arc::new(follow_db.into_connection())),
            UserRepository::new(Arc::new(user_db.into_connection())),
        )
    }

    #[tokio::test]
    async fn test_following_feed_anonymous_is_empty() {
        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
            MockDatabase::new(DatabaseBackend::Postgres),
        );

        let page = service
            .fetch_page(None, &FeedFilter::Following, 10, None)
            .await
            .unwrap();

        assert!(page.tweets.is_empty());
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_page_with_continuation() {
        // limit 2, three rows scripted: the third becomes the cursor
        let t3 = create_test_tweet("t3", "u1", 30);
        let t2 = create_test_tweet("t2", "u1", 20);
        let t1 = create_test_tweet("t1", "u1", 10);
        let expected_cursor =
            FeedCursor::new(t1.created_at.with_timezone(&Utc), t1.id.clone()).encode();

        let tweet_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[t3, t2, t1]]);
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "tweet_id" => sea_orm::Value::String(Some(Box::new("t3".to_string()))),
                "like_count" => sea_orm::Value::BigInt(Some(2))
            }]])
            .append_query_results([[maplit::btreemap! {
                "tweet_id" => sea_orm::Value::String(Some(Box::new("t2".to_string())))
            }]]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]]);

        let service = service_with(
            tweet_db,
            like_db,
            MockDatabase::new(DatabaseBackend::Postgres),
            user_db,
        );

        let page = service
            .fetch_page(Some("viewer"), &FeedFilter::Global, 2, None)
            .await
            .unwrap();

        assert_eq!(page.tweets.len(), 2);
        assert_eq!(page.tweets[0].id, "t3");
        assert_eq!(page.tweets[0].like_count, 2);
        assert!(!page.tweets[0].liked_by_me);
        assert_eq!(page.tweets[1].id, "t2");
        assert_eq!(page.tweets[1].like_count, 0);
        assert!(page.tweets[1].liked_by_me);
        assert_eq!(page.tweets[0].user.name.as_deref(), Some("alice"));
        assert_eq!(page.next_cursor, Some(expected_cursor));
    }

    #[tokio::test]
    async fn test_page_without_continuation() {
        let t1 = create_test_tweet("t1", "u1", 10);

        let tweet_db =
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[t1]]);
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            // no likes at all
            .append_query_results([Vec::<std::collections::BTreeMap<&str, sea_orm::Value>>::new()]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]]);

        let service = service_with(
            tweet_db,
            like_db,
            MockDatabase::new(DatabaseBackend::Postgres),
            user_db,
        );

        let page = service
            .fetch_page(None, &FeedFilter::Global, 10, None)
            .await
            .unwrap();

        assert_eq!(page.tweets.len(), 1);
        assert_eq!(page.tweets[0].like_count, 0);
        assert!(!page.tweets[0].liked_by_me);
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_author_feed_keeps_order() {
        let t2 = create_test_tweet("t2", "u2", 20);
        let t1 = create_test_tweet("t1", "u2", 10);

        let tweet_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[t2, t1]]);
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<std::collections::BTreeMap<&str, sea_orm::Value>>::new()]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u2", "bob")]]);

        let service = service_with(
            tweet_db,
            like_db,
            MockDatabase::new(DatabaseBackend::Postgres),
            user_db,
        );

        let page = service
            .fetch_page(None, &FeedFilter::Author("u2".to_string()), 10, None)
            .await
            .unwrap();

        let ids: Vec<&str> = page.tweets.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["t2", "t1"]);
        assert!(
            page.tweets
                .windows(2)
                .all(|w| (w[0].created_at, &w[0].id) > (w[1].created_at, &w[1].id))
        );
    }

    #[tokio::test]
    async fn test_following_feed_returns_followed_authors() {
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[maplit::btreemap! {
                "followee_id" => sea_orm::Value::String(Some(Box::new("u1".to_string())))
            }]]);
        let tweet_db = MockDatabase::new(DatabaseBackend::Postgres).append_query_results([[
            create_test_tweet("t2", "u1", 20),
            create_test_tweet("t1", "u1", 10),
        ]]);
        let like_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<std::collections::BTreeMap<&str, sea_orm::Value>>::new()])
            .append_query_results([Vec::<std::collections::BTreeMap<&str, sea_orm::Value>>::new()]);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[create_test_user("u1", "alice")]]);

        let service = service_with(tweet_db, like_db, follow_db, user_db);

        let page = service
            .fetch_page(Some("viewer"), &FeedFilter::Following, 10, None)
            .await
            .unwrap();

        assert_eq!(page.tweets.len(), 2);
        assert!(page.tweets.iter().all(|t| t.user.id == "u1"));
        assert!(
            page.tweets
                .windows(2)
                .all(|w| (w[0].created_at, &w[0].id) > (w[1].created_at, &w[1].id))
        );
        assert!(page.next_cursor.is_none());
    }

    #[tokio::test]
    async fn test_following_feed_with_no_followees_is_empty() {
        // followee_ids query returns nothing; tweet query must be skipped
        let follow_db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<std::collections::BTreeMap<&str, sea_orm::Value>>::new()]);
        let like_db = MockDatabase::new(DatabaseBackend::Postgres);
        let user_db = MockDatabase::new(DatabaseBackend::Postgres);

        let service = service_with(
            MockDatabase::new(DatabaseBackend::Postgres),
            like_db,
            follow_db,
            user_db,
        );

        let page = service
            .fetch_page(Some("viewer"), &FeedFilter::Following, 10, None)
            .await
            .unwrap();

        assert!(page.tweets.is_empty());
        assert!(page.next_cursor.is_none());
    }
}
