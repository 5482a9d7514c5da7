//! Retweet service.

use chirp_common::{AppError, AppResult, ConflictKind, IdGenerator, Metrics, SharedClock, get_metrics};
use chirp_db::{entities::tweet, repositories::TweetRepository};
use sea_orm::Set;

use super::NotificationService;
use crate::views::{TweetHydrator, TweetView};

/// Retweet service for business logic.
///
/// A retweet is a tweet row owned by the retweeter with `original_tweet_id`
/// set. Retweeting a retweet record acts on the tweet it points at, so
/// `original_tweet_id` always names a root or reply, never another retweet.
#[derive(Clone)]
pub struct RetweetService {
    tweet_repo: TweetRepository,
    notifications: NotificationService,
    hydrator: TweetHydrator,
    id_gen: IdGenerator,
    clock: SharedClock,
}

impl RetweetService {
    /// Create a new retweet service.
    #[must_use]
    pub const fn new(
        tweet_repo: TweetRepository,
        notifications: NotificationService,
        hydrator: TweetHydrator,
        clock: SharedClock,
    ) -> Self {
        Self {
            tweet_repo,
            notifications,
            hydrator,
            id_gen: IdGenerator::new(),
            clock,
        }
    }

    /// Retweet a tweet. Returns the new retweet record with the original
    /// embedded.
    pub async fn retweet(&self, user_id: &str, tweet_id: &str) -> AppResult<TweetView> {
        let original = self.resolve_original(tweet_id).await?;

        let record = tweet::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            content: Set(original.content.clone()),
            content_lower: Set(original.content_lower.clone()),
            image: Set(original.image.clone()),
            reply_to_id: Set(None),
            original_tweet_id: Set(Some(original.id.clone())),
            is_reply: Set(false),
            is_retweet: Set(true),
            retweet_count: Set(0),
            created_at: Set(self.clock.now()),
        };

        let Some(created) = self.tweet_repo.create_retweet(record, &original.id).await? else {
            return Err(ConflictKind::AlreadyRetweeted.into());
        };
        Metrics::incr(&get_metrics().retweets_created);

        tracing::debug!(user_id, original_id = %original.id, retweet_id = %created.id, "Retweeted");

        self.notifications
            .notify_retweet(&original.user_id, user_id, &original.id)
            .await;

        let id = created.id.clone();
        self.hydrator
            .hydrate_one(created)
            .await?
            .ok_or(AppError::TweetNotFound(id))
    }

    /// Undo a retweet. Returns the original tweet as it stands afterwards.
    pub async fn unretweet(&self, user_id: &str, tweet_id: &str) -> AppResult<TweetView> {
        let original = self.resolve_original(tweet_id).await?;

        if self
            .tweet_repo
            .delete_retweet(user_id, &original.id)
            .await?
            .is_none()
        {
            return Err(ConflictKind::NotRetweeted.into());
        }
        Metrics::incr(&get_metrics().retweets_removed);

        self.notifications
            .retract_retweet(&original.user_id, user_id, &original.id)
            .await;

        let refreshed = self.tweet_repo.get_by_id(&original.id).await?;
        self.hydrator
            .hydrate_one(refreshed)
            .await?
            .ok_or(AppError::TweetNotFound(original.id))
    }

    /// Rebuild a tweet's `retweet_count` from its retweet records.
    pub async fn repair_count(&self, tweet_id: &str) -> AppResult<u64> {
        let original = self.resolve_original(tweet_id).await?;
        let count = self.tweet_repo.recount_retweets(&original.id).await?;
        tracing::info!(tweet_id = %original.id, count, "Recounted retweets");
        Ok(count)
    }

    /// The tweet a retweet action targets: the record itself, or what it
    /// points at if it is a retweet record.
    async fn resolve_original(&self, tweet_id: &str) -> AppResult<tweet::Model> {
        let target = self.tweet_repo.get_by_id(tweet_id).await?;
        match &target.original_tweet_id {
            Some(original_id) => self.tweet_repo.get_by_id(original_id).await,
            None => Ok(target),
        }
    }
}
