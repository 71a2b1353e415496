//! Profile service.

use chirp_common::AppResult;
use chirp_db::repositories::{FollowRepository, TweetRepository, UserRepository};
use serde::{Deserialize, Serialize};

/// Profile summary for a user, annotated for the requesting viewer.
///
/// Counts are derived per request; nothing here is stored denormalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: Option<String>,
    pub image: Option<String>,
    pub tweet_count: u64,
    pub followers_count: u64,
    pub follows_count: u64,
    /// Whether the requesting viewer follows this user. Always `false` for
    /// anonymous viewers.
    pub is_following: bool,
}

/// Profile service for business logic.
#[derive(Clone)]
pub struct ProfileService {
    user_repo: UserRepository,
    tweet_repo: TweetRepository,
    follow_repo: FollowRepository,
}

impl ProfileService {
    /// Create a new profile service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        tweet_repo: TweetRepository,
        follow_repo: FollowRepository,
    ) -> Self {
        Self {
            user_repo,
            tweet_repo,
            follow_repo,
        }
    }

    /// Get a user's profile summary.
    pub async fn get(&self, user_id: &str, viewer_id: Option<&str>) -> AppResult<Profile> {
        let user = self.user_repo.get_by_id(user_id).await?;

        let tweet_count = self.tweet_repo.count_by_user(user_id).await?;
        let followers_count = self.follow_repo.count_followers(user_id).await?;
        let follows_count = self.follow_repo.count_following(user_id).await?;

        let is_following = match viewer_id {
            Some(viewer_id) => self.follow_repo.is_following(viewer_id, user_id).await?,
            None => false,
        };

        Ok(Profile {
            name: user.name,
            image: user.avatar_url,
            tweet_count,
            followers_count,
            follows_count,
            is_following,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chirp_common::AppError;
    use chirp_db::entities::{follow, user};
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            name: Some(username.to_string()),
            avatar_url: Some("https://cdn.example/a.png".to_string()),
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn count_row(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
        maplit::btreemap! {
            "num_items" => sea_orm::Value::BigInt(Some(n))
        }
    }

    #[tokio::test]
    async fn test_get_profile_not_found() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let tweet_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = ProfileService::new(
            UserRepository::new(user_db),
            TweetRepository::new(tweet_db),
            FollowRepository::new(follow_db),
        );

        let result = service.get("ghost", None).await;
        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "ghost"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_get_profile_anonymous_viewer() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice")]])
                .into_connection(),
        );
        let tweet_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(7)]])
                .into_connection(),
        );
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(3)]])
                .append_query_results([[count_row(2)]])
                .into_connection(),
        );

        let service = ProfileService::new(
            UserRepository::new(user_db),
            TweetRepository::new(tweet_db),
            FollowRepository::new(follow_db),
        );

        let profile = service.get("u1", None).await.unwrap();

        assert_eq!(profile.name.as_deref(), Some("alice"));
        assert_eq!(profile.tweet_count, 7);
        assert_eq!(profile.followers_count, 3);
        assert_eq!(profile.follows_count, 2);
        assert!(!profile.is_following);
    }

    #[tokio::test]
    async fn test_get_profile_viewer_following() {
        let edge = follow::Model {
            id: "f1".to_string(),
            follower_id: "viewer".to_string(),
            followee_id: "u1".to_string(),
            created_at: Utc::now().into(),
        };

        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("u1", "alice")]])
                .into_connection(),
        );
        let tweet_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(1)]])
                .into_connection(),
        );
        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[count_row(1)]])
                .append_query_results([[count_row(0)]])
                .append_query_results([[edge]])
                .into_connection(),
        );

        let service = ProfileService::new(
            UserRepository::new(user_db),
            TweetRepository::new(tweet_db),
            FollowRepository::new(follow_db),
        );

        let profile = service.get("u1", Some("viewer")).await.unwrap();

        assert!(profile.is_following);
    }
}
