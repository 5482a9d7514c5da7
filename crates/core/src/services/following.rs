//! Following service.

use std::collections::{HashMap, HashSet};

use chirp_common::{AppError, AppResult, ConflictKind, IdGenerator, Metrics, SharedClock, get_metrics};
use chirp_db::{
    entities::{following, user},
    repositories::{FollowingRepository, UserRepository},
};
use sea_orm::Set;

use super::NotificationService;
use crate::views::UserProfile;

/// Following service for business logic.
#[derive(Clone)]
pub struct FollowingService {
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    notifications: NotificationService,
    id_gen: IdGenerator,
    clock: SharedClock,
}

impl FollowingService {
    /// Create a new following service.
    #[must_use]
    pub const fn new(
        following_repo: FollowingRepository,
        user_repo: UserRepository,
        notifications: NotificationService,
        clock: SharedClock,
    ) -> Self {
        Self {
            following_repo,
            user_repo,
            notifications,
            id_gen: IdGenerator::new(),
            clock,
        }
    }

    /// Follow a user.
    ///
    /// Adds the edge, bumps both counters and notifies the followee.
    pub async fn follow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if follower_id == followee_id {
            return Err(ConflictKind::SelfFollow.into());
        }

        self.user_repo.get_by_id(follower_id).await?;
        self.user_repo.get_by_id(followee_id).await?;

        let model = following::ActiveModel {
            id: Set(self.id_gen.generate()),
            follower_id: Set(follower_id.to_string()),
            followee_id: Set(followee_id.to_string()),
            created_at: Set(self.clock.now()),
        };

        if !self.following_repo.create_edge(model).await? {
            return Err(ConflictKind::AlreadyFollowing.into());
        }
        Metrics::incr(&get_metrics().follows_created);

        tracing::debug!(follower_id, followee_id, "Followed user");

        self.notifications
            .notify_follow(followee_id, follower_id)
            .await;

        Ok(())
    }

    /// Unfollow a user. The earlier follow notification is kept.
    pub async fn unfollow(&self, follower_id: &str, followee_id: &str) -> AppResult<()> {
        if follower_id == followee_id {
            return Err(ConflictKind::SelfFollow.into());
        }

        self.user_repo.get_by_id(followee_id).await?;

        if !self
            .following_repo
            .delete_edge(follower_id, followee_id)
            .await?
        {
            return Err(ConflictKind::NotFollowing.into());
        }
        Metrics::incr(&get_metrics().follows_removed);

        tracing::debug!(follower_id, followee_id, "Unfollowed user");

        Ok(())
    }

    /// Check if following.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        self.following_repo
            .is_following(follower_id, followee_id)
            .await
    }

    /// Users following `username`, most recent first.
    pub async fn followers(
        &self,
        username: &str,
        viewer_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<UserProfile>> {
        let user = self.user_repo.get_by_username(username).await?;
        let edges = self
            .following_repo
            .find_followers(&user.id, limit, offset)
            .await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.follower_id).collect();

        self.profiles(ids, viewer_id).await
    }

    /// Users `username` follows, most recent first.
    pub async fn following(
        &self,
        username: &str,
        viewer_id: Option<&str>,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<UserProfile>> {
        let user = self.user_repo.get_by_username(username).await?;
        let edges = self
            .following_repo
            .find_following(&user.id, limit, offset)
            .await?;
        let ids: Vec<String> = edges.into_iter().map(|e| e.followee_id).collect();

        self.profiles(ids, viewer_id).await
    }

    /// Rebuild a user's counters from the edge rows.
    pub async fn repair_counts(&self, user_id: &str) -> AppResult<(u64, u64)> {
        self.user_repo.get_by_id(user_id).await?;
        let counts = self.following_repo.recount(user_id).await?;
        tracing::info!(
            user_id,
            followers = counts.0,
            following = counts.1,
            "Recounted follow counters"
        );
        Ok(counts)
    }

    /// Profiles for `ids` in the given order, with follow state for the viewer.
    async fn profiles(&self, ids: Vec<String>, viewer_id: Option<&str>) -> AppResult<Vec<UserProfile>> {
        let users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let followed: Option<HashSet<String>> = match viewer_id {
            Some(viewer_id) => Some(
                self.following_repo
                    .find_followee_ids(viewer_id)
                    .await?
                    .into_iter()
                    .collect(),
            ),
            None => None,
        };

        Ok(ids
            .iter()
            .filter_map(|id| users.get(id))
            .map(|u| {
                let mut profile = UserProfile::from(u);
                profile.is_following = followed.as_ref().map(|set| set.contains(&u.id));
                profile
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chirp_common::ManualClock;
    use chirp_db::{repositories::NotificationRepository, test_utils::TestDatabase};
    use std::sync::Arc;

    async fn service() -> FollowingService {
        let db = TestDatabase::in_memory().await.unwrap().connection();
        let clock: SharedClock = Arc::new(ManualClock::default());
        let user_repo = UserRepository::new(Arc::clone(&db));
        let notifications = NotificationService::new(
            NotificationRepository::new(Arc::clone(&db)),
            user_repo.clone(),
            Arc::clone(&clock),
        );
        FollowingService::new(FollowingRepository::new(db), user_repo, notifications, clock)
    }

    #[tokio::test]
    async fn test_self_follow_rejected_before_lookup() {
        let service = service().await;

        let err = service.follow("ghost", "ghost").await.unwrap_err();
        assert_eq!(err.conflict_kind(), Some(ConflictKind::SelfFollow));

        let err = service.unfollow("ghost", "ghost").await.unwrap_err();
        assert_eq!(err.conflict_kind(), Some(ConflictKind::SelfFollow));
    }

    #[tokio::test]
    async fn test_follow_unknown_user() {
        let service = service().await;

        let err = service.follow("a", "b").await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }
}
