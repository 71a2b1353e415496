//! Follow service.

use crate::services::like::ToggleOutcome;
use crate::services::revalidate::SharedInvalidator;
use chirp_common::{AppError, AppResult, IdGenerator};
use chirp_db::{
    entities::follow,
    repositories::{FollowRepository, UserRepository},
};
use sea_orm::Set;

/// Follow service for business logic.
#[derive(Clone)]
pub struct FollowService {
    follow_repo: FollowRepository,
    user_repo: UserRepository,
    invalidator: Option<SharedInvalidator>,
    id_gen: IdGenerator,
}

impl FollowService {
    /// Create a new follow service.
    #[must_use]
    pub fn new(follow_repo: FollowRepository, user_repo: UserRepository) -> Self {
        Self {
            follow_repo,
            user_repo,
            invalidator: None,
            id_gen: IdGenerator::new(),
        }
    }

    /// Set the page invalidator.
    pub fn set_invalidator(&mut self, invalidator: SharedInvalidator) {
        self.invalidator = Some(invalidator);
    }

    /// Toggle a follow: unfollow if present, follow otherwise.
    ///
    /// Both profile pages carry follower/follows numbers, so a successful
    /// toggle requests a re-render of each; those requests are
    /// fire-and-forget.
    pub async fn toggle(&self, follower_id: &str, followee_id: &str) -> AppResult<ToggleOutcome> {
        // Can't follow yourself
        if follower_id == followee_id {
            return Err(AppError::BadRequest("Cannot follow yourself".to_string()));
        }

        // 404 for unknown targets
        self.user_repo.get_by_id(followee_id).await?;

        let outcome = if self
            .follow_repo
            .is_following(follower_id, followee_id)
            .await?
        {
            self.follow_repo
                .delete_by_pair(follower_id, followee_id)
                .await?;
            ToggleOutcome { added: false }
        } else {
            let model = follow::ActiveModel {
                id: Set(self.id_gen.generate()),
                follower_id: Set(follower_id.to_string()),
                followee_id: Set(followee_id.to_string()),
                created_at: Set(chrono::Utc::now().into()),
            };

            match self.follow_repo.create(model).await {
                Ok(_) => ToggleOutcome { added: true },
                Err(AppError::Conflict(_)) => {
                    // Lost a duplicate-toggle race; the unique index
                    // arbitrates. Report the state the store settled on.
                    let added = self
                        .follow_repo
                        .is_following(follower_id, followee_id)
                        .await?;
                    tracing::debug!(
                        follower_id = %follower_id,
                        followee_id = %followee_id,
                        added = added,
                        "Follow toggle raced, resolved from store"
                    );
                    ToggleOutcome { added }
                }
                Err(e) => return Err(e),
            }
        };

        self.revalidate_profiles(&[followee_id, follower_id]).await;

        Ok(outcome)
    }

    /// Request re-renders of the given users' profile pages.
    async fn revalidate_profiles(&self, user_ids: &[&str]) {
        if let Some(ref invalidator) = self.invalidator {
            for user_id in user_ids {
                if let Err(e) = invalidator.invalidate(&format!("/profile/{user_id}")).await {
                    tracing::warn!(error = %e, user_id = %user_id, "Failed to revalidate profile page");
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chirp_db::entities::user;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, username: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: username.to_string(),
            name: Some(username.to_string()),
            avatar_url: None,
            token: None,
            created_at: Utc::now().into(),
        }
    }

    fn create_test_follow(id: &str, follower_id: &str, followee_id: &str) -> follow::Model {
        follow::Model {
            id: id.to_string(),
            follower_id: follower_id.to_string(),
            followee_id: followee_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_toggle_rejects_self_follow() {
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = FollowService::new(
            FollowRepository::new(follow_db),
            UserRepository::new(user_db),
        );

        let result = service.toggle("user1", "user1").await;
        match result {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("yourself")),
            _ => panic!("Expected BadRequest error"),
        }
    }

    #[tokio::test]
    async fn test_toggle_target_not_found() {
        let follow_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );

        let service = FollowService::new(
            FollowRepository::new(follow_db),
            UserRepository::new(user_db),
        );

        let result = service.toggle("user1", "ghost").await;
        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "ghost"),
            _ => panic!("Expected UserNotFound error"),
        }
    }

    #[tokio::test]
    async fn test_toggle_removes_existing_follow() {
        let existing = create_test_follow("f1", "user1", "user2");

        let follow_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                // is_following
                .append_query_results([[existing.clone()]])
                // delete_by_pair: find, then delete
                .append_query_results([[existing]])
                .append_exec_results([sea_orm::MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_user("user2", "bob")]])
                .into_connection(),
        );

        let service = FollowService::new(
            FollowRepository::new(follow_db),
            UserRepository::new(user_db),
        );

        let outcome = service.toggle("user1", "user2").await.unwrap();
        assert!(!outcome.added);
    }
}
