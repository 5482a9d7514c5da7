//! Tweet service.

use chirp_common::{AppError, AppResult, IdGenerator, Metrics, SharedClock, get_metrics};
use chirp_db::{entities::tweet, repositories::TweetRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use super::NotificationService;
use crate::views::{TweetDetail, TweetHydrator, TweetView};

/// Input for posting a tweet or a reply.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTweetInput {
    #[validate(length(min = 1, max = 280))]
    pub content: String,

    #[validate(length(max = 1024))]
    pub image: Option<String>,
}

/// Tweet service for business logic.
#[derive(Clone)]
pub struct TweetService {
    tweet_repo: TweetRepository,
    notifications: NotificationService,
    hydrator: TweetHydrator,
    id_gen: IdGenerator,
    clock: SharedClock,
}

impl TweetService {
    /// Create a new tweet service.
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

    /// Post a root tweet.
    pub async fn post(&self, user_id: &str, input: CreateTweetInput) -> AppResult<TweetView> {
        let (content, image) = Self::clean(input)?;

        let model = self.new_tweet(user_id, content, image, None);
        let created = self.tweet_repo.create(model).await?;
        Metrics::incr(&get_metrics().tweets_created);

        tracing::debug!(user_id, tweet_id = %created.id, "Posted tweet");

        self.view(created).await
    }

    /// Reply to a tweet and notify its author.
    pub async fn reply(
        &self,
        user_id: &str,
        parent_id: &str,
        input: CreateTweetInput,
    ) -> AppResult<TweetView> {
        let (content, image) = Self::clean(input)?;
        let parent = self.tweet_repo.get_by_id(parent_id).await?;

        let model = self.new_tweet(user_id, content, image, Some(parent.id.clone()));
        let created = self.tweet_repo.create(model).await?;
        Metrics::incr(&get_metrics().tweets_created);

        tracing::debug!(user_id, tweet_id = %created.id, parent_id = %parent.id, "Posted reply");

        self.notifications
            .notify_reply(&parent.user_id, user_id, &parent.id, &created.content)
            .await;

        self.view(created).await
    }

    /// A tweet and its direct replies, newest first.
    pub async fn show(&self, tweet_id: &str, replies_limit: u64) -> AppResult<TweetDetail> {
        let tweet = self.tweet_repo.get_by_id(tweet_id).await?;
        let tweet = self.view(tweet).await?;

        let replies = self.tweet_repo.find_replies(tweet_id, replies_limit).await?;
        let replies = self.hydrator.hydrate(replies).await?;

        Ok(TweetDetail { tweet, replies })
    }

    /// Delete one of the user's tweets.
    ///
    /// Retweet records of it, likes and notifications about any of them go
    /// too. Deleting a retweet record counts as undoing the retweet.
    pub async fn delete(&self, user_id: &str, tweet_id: &str) -> AppResult<()> {
        let tweet = self.tweet_repo.get_by_id(tweet_id).await?;

        if tweet.user_id != user_id {
            return Err(AppError::Forbidden(
                "Cannot delete another user's tweet".to_string(),
            ));
        }

        let removed = self.tweet_repo.delete_with_dependents(&tweet).await?;
        Metrics::add(&get_metrics().tweets_deleted, removed.len() as u64);

        if let Some(original_id) = &tweet.original_tweet_id {
            Metrics::incr(&get_metrics().retweets_removed);
            if let Some(original) = self.tweet_repo.find_by_id(original_id).await? {
                self.notifications
                    .retract_retweet(&original.user_id, user_id, original_id)
                    .await;
            }
        }

        tracing::info!(user_id, tweet_id, removed = removed.len(), "Deleted tweet");

        Ok(())
    }

    fn clean(input: CreateTweetInput) -> AppResult<(String, Option<String>)> {
        input.validate()?;

        let content = input.content.trim().to_string();
        if content.is_empty() {
            return Err(AppError::Validation("Tweet content is required".to_string()));
        }
        let image = input.image.filter(|url| !url.trim().is_empty());

        Ok((content, image))
    }

    fn new_tweet(
        &self,
        user_id: &str,
        content: String,
        image: Option<String>,
        reply_to_id: Option<String>,
    ) -> tweet::ActiveModel {
        tweet::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(user_id.to_string()),
            content_lower: Set(content.to_lowercase()),
            content: Set(content),
            image: Set(image),
            is_reply: Set(reply_to_id.is_some()),
            reply_to_id: Set(reply_to_id),
            original_tweet_id: Set(None),
            is_retweet: Set(false),
            retweet_count: Set(0),
            created_at: Set(self.clock.now()),
        }
    }

    async fn view(&self, tweet: tweet::Model) -> AppResult<TweetView> {
        let id = tweet.id.clone();
        self.hydrator
            .hydrate_one(tweet)
            .await?
            .ok_or(AppError::TweetNotFound(id))
    }
}
