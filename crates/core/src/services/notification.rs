//! Notification service.
//!
//! Fan-out of engagement events into notification rows, their retraction, and
//! the recipient's read side.

use chirp_common::{AppError, AppResult, IdGenerator, Metrics, SharedClock, get_metrics};
use chirp_db::{
    Cursor,
    entities::notification::{self, NotificationType},
    repositories::{NotificationRepository, UserRepository},
};
use sea_orm::Set;

use crate::views::{NotificationView, Page, next_cursor, notification_views};

/// Longest reply excerpt stored on a reply notification, in characters.
const SNIPPET_LEN: usize = 50;

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
    clock: SharedClock,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub const fn new(
        notification_repo: NotificationRepository,
        user_repo: UserRepository,
        clock: SharedClock,
    ) -> Self {
        Self {
            notification_repo,
            user_repo,
            id_gen: IdGenerator::new(),
            clock,
        }
    }

    /// Notify a tweet's author that `actor_id` liked it.
    pub async fn notify_like(
        &self,
        recipient_id: &str,
        actor_id: &str,
        tweet_id: &str,
    ) -> Option<notification::Model> {
        self.create(recipient_id, actor_id, NotificationType::Like, Some(tweet_id), None)
            .await
    }

    /// Notify an original tweet's author that `actor_id` retweeted it.
    pub async fn notify_retweet(
        &self,
        recipient_id: &str,
        actor_id: &str,
        original_id: &str,
    ) -> Option<notification::Model> {
        self.create(
            recipient_id,
            actor_id,
            NotificationType::Retweet,
            Some(original_id),
            None,
        )
        .await
    }

    /// Notify a parent tweet's author about a reply, with an excerpt of the
    /// reply. The subject is the parent, so the notification goes with it.
    pub async fn notify_reply(
        &self,
        recipient_id: &str,
        actor_id: &str,
        parent_id: &str,
        reply_content: &str,
    ) -> Option<notification::Model> {
        self.create(
            recipient_id,
            actor_id,
            NotificationType::Reply,
            Some(parent_id),
            Some(snippet(reply_content)),
        )
        .await
    }

    /// Notify a user that `actor_id` followed them.
    pub async fn notify_follow(
        &self,
        recipient_id: &str,
        actor_id: &str,
    ) -> Option<notification::Model> {
        self.create(recipient_id, actor_id, NotificationType::Follow, None, None)
            .await
    }

    /// Remove the like notification for an undone like. Never fails.
    pub async fn retract_like(&self, recipient_id: &str, actor_id: &str, tweet_id: &str) {
        self.retract(recipient_id, actor_id, NotificationType::Like, tweet_id)
            .await;
    }

    /// Remove the retweet notification for an undone retweet. Never fails.
    pub async fn retract_retweet(&self, recipient_id: &str, actor_id: &str, original_id: &str) {
        self.retract(recipient_id, actor_id, NotificationType::Retweet, original_id)
            .await;
    }

    /// Self-actions produce nothing and return `None`. So does a failed
    /// insert: the engagement that triggered it has already been applied.
    async fn create(
        &self,
        recipient_id: &str,
        actor_id: &str,
        notification_type: NotificationType,
        tweet_id: Option<&str>,
        content: Option<String>,
    ) -> Option<notification::Model> {
        if recipient_id == actor_id {
            return None;
        }

        let model = notification::ActiveModel {
            id: Set(self.id_gen.generate()),
            recipient_id: Set(recipient_id.to_string()),
            actor_id: Set(actor_id.to_string()),
            notification_type: Set(notification_type),
            tweet_id: Set(tweet_id.map(str::to_string)),
            content: Set(content),
            is_read: Set(false),
            created_at: Set(self.clock.now()),
        };

        match self.notification_repo.create(model).await {
            Ok(created) => {
                Metrics::incr(&get_metrics().notifications_created);
                tracing::debug!(
                    recipient_id = %recipient_id,
                    actor_id = %actor_id,
                    kind = ?notification_type,
                    "Created notification"
                );
                Some(created)
            }
            Err(e) => {
                Metrics::incr(&get_metrics().notification_create_failures);
                tracing::warn!(
                    error = %e,
                    recipient_id = %recipient_id,
                    actor_id = %actor_id,
                    kind = ?notification_type,
                    "Failed to create notification"
                );
                None
            }
        }
    }

    async fn retract(
        &self,
        recipient_id: &str,
        actor_id: &str,
        notification_type: NotificationType,
        tweet_id: &str,
    ) {
        if recipient_id == actor_id {
            return;
        }

        match self
            .notification_repo
            .delete_matching(recipient_id, actor_id, notification_type, Some(tweet_id))
            .await
        {
            Ok(removed) => {
                if removed > 0 {
                    Metrics::incr(&get_metrics().notifications_retracted);
                }
            }
            Err(e) => {
                Metrics::incr(&get_metrics().notification_retraction_failures);
                tracing::warn!(
                    error = %e,
                    recipient_id = %recipient_id,
                    tweet_id = %tweet_id,
                    kind = ?notification_type,
                    "Failed to retract notification"
                );
            }
        }
    }

    /// A user's notifications, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&Cursor>,
        unread_only: bool,
    ) -> AppResult<Page<NotificationView>> {
        let rows = self
            .notification_repo
            .find_by_recipient(user_id, limit, cursor, unread_only)
            .await?;
        let next_cursor = next_cursor(&rows, limit, |n| Cursor::after(n.created_at, &n.id));

        let items = notification_views(&self.user_repo, rows).await?;
        Ok(Page { items, next_cursor })
    }

    /// Count unread notifications.
    pub async fn unread_count(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.count_unread(user_id).await
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_as_read(&self, user_id: &str, notification_id: &str) -> AppResult<()> {
        let notification = self.notification_repo.get_by_id(notification_id).await?;

        if notification.recipient_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to update this notification".to_string(),
            ));
        }

        if notification.is_read {
            return Ok(());
        }

        self.notification_repo.mark_as_read(notification_id).await
    }

    /// Mark every notification of the user as read.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }
}

/// First 50 characters of a reply, with `...` appended when cut.
fn snippet(content: &str) -> String {
    if content.chars().count() > SNIPPET_LEN {
        let head: String = content.chars().take(SNIPPET_LEN).collect();
        format!("{head}...")
    } else {
        content.to_string()
    }
}
