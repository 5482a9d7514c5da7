//! Like service.

use chirp_common::{AppError, AppResult, ConflictKind, IdGenerator, Metrics, SharedClock, get_metrics};
use chirp_db::{
    entities::{tweet, tweet_like},
    repositories::{TweetLikeRepository, TweetRepository},
};
use sea_orm::Set;

use super::NotificationService;
use crate::views::{TweetHydrator, TweetView};

/// Like service for business logic.
///
/// The like set of a tweet is its `tweet_like` rows; the unique
/// `(tweet_id, user_id)` index makes adding a member a single conditional
/// insert, so concurrent likes never lose updates or duplicate.
#[derive(Clone)]
pub struct LikeService {
    like_repo: TweetLikeRepository,
    tweet_repo: TweetRepository,
    notifications: NotificationService,
    hydrator: TweetHydrator,
    id_gen: IdGenerator,
    clock: SharedClock,
}

impl LikeService {
    /// Create a new like service.
    #[must_use]
    pub const fn new(
        like_repo: TweetLikeRepository,
        tweet_repo: TweetRepository,
        notifications: NotificationService,
        hydrator: TweetHydrator,
        clock: SharedClock,
    ) -> Self {
        Self {
            like_repo,
            tweet_repo,
            notifications,
            hydrator,
            id_gen: IdGenerator::new(),
            clock,
        }
    }

    /// Like a tweet and notify its author. Returns the updated tweet.
    pub async fn like(&self, user_id: &str, tweet_id: &str) -> AppResult<TweetView> {
        let tweet = self.tweet_repo.get_by_id(tweet_id).await?;

        let model = tweet_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            tweet_id: Set(tweet.id.clone()),
            user_id: Set(user_id.to_string()),
            created_at: Set(self.clock.now()),
        };

        if !self.like_repo.insert(model).await? {
            return Err(ConflictKind::AlreadyLiked.into());
        }
        Metrics::incr(&get_metrics().likes_created);

        self.notifications
            .notify_like(&tweet.user_id, user_id, &tweet.id)
            .await;

        self.view(tweet).await
    }

    /// Remove a like and retract its notification. Returns the updated tweet.
    pub async fn unlike(&self, user_id: &str, tweet_id: &str) -> AppResult<TweetView> {
        let tweet = self.tweet_repo.get_by_id(tweet_id).await?;

        if !self.like_repo.delete_by_pair(&tweet.id, user_id).await? {
            return Err(ConflictKind::NotLiked.into());
        }
        Metrics::incr(&get_metrics().likes_removed);

        self.notifications
            .retract_like(&tweet.user_id, user_id, &tweet.id)
            .await;

        self.view(tweet).await
    }

    /// Check if a user liked a tweet.
    pub async fn is_liked(&self, user_id: &str, tweet_id: &str) -> AppResult<bool> {
        self.like_repo.is_liked(tweet_id, user_id).await
    }

    async fn view(&self, tweet: tweet::Model) -> AppResult<TweetView> {
        let id = tweet.id.clone();
        self.hydrator
            .hydrate_one(tweet)
            .await?
            .ok_or(AppError::TweetNotFound(id))
    }
}
