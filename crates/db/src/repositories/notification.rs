//! Notification repository.

use std::sync::Arc;

use super::db_error;
use crate::entities::{Notification, notification};
use crate::pagination::Cursor;
use chirp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, sea_query::Expr,
};

/// Notification repository for database operations.
#[derive(Clone)]
pub struct NotificationRepository {
    db: Arc<DatabaseConnection>,
}

impl NotificationRepository {
    /// Create a new notification repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a notification by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<notification::Model>> {
        Notification::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a notification by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<notification::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Notification: {id}")))
    }

    /// Create a new notification.
    pub async fn create(
        &self,
        model: notification::ActiveModel,
    ) -> AppResult<notification::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// A user's notifications, newest first.
    pub async fn find_by_recipient(
        &self,
        recipient_id: &str,
        limit: u64,
        cursor: Option<&Cursor>,
        unread_only: bool,
    ) -> AppResult<Vec<notification::Model>> {
        let mut condition =
            Condition::all().add(notification::Column::RecipientId.eq(recipient_id));

        if unread_only {
            condition = condition.add(notification::Column::IsRead.eq(false));
        }

        if let Some(cursor) = cursor {
            condition = condition.add(cursor.older_than(
                notification::Column::CreatedAt,
                notification::Column::Id,
            ));
        }

        Notification::find()
            .filter(condition)
            .order_by_desc(notification::Column::CreatedAt)
            .order_by_desc(notification::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Notifications about a tweet, any kind.
    pub async fn find_by_tweet(&self, tweet_id: &str) -> AppResult<Vec<notification::Model>> {
        Notification::find()
            .filter(notification::Column::TweetId.eq(tweet_id))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Mark a notification as read.
    pub async fn mark_as_read(&self, id: &str) -> AppResult<()> {
        Notification::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(())
    }

    /// Mark all of a user's notifications as read. Returns how many changed.
    pub async fn mark_all_as_read(&self, recipient_id: &str) -> AppResult<u64> {
        let result = Notification::update_many()
            .col_expr(notification::Column::IsRead, Expr::value(true))
            .filter(notification::Column::RecipientId.eq(recipient_id))
            .filter(notification::Column::IsRead.eq(false))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;
        Ok(result.rows_affected)
    }

    /// Count unread notifications for a user.
    pub async fn count_unread(&self, recipient_id: &str) -> AppResult<u64> {
        Notification::find()
            .filter(notification::Column::RecipientId.eq(recipient_id))
            .filter(notification::Column::IsRead.eq(false))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Delete the notification(s) matching one engagement. Returns how many
    /// rows were removed.
    pub async fn delete_matching(
        &self,
        recipient_id: &str,
        actor_id: &str,
        notification_type: notification::NotificationType,
        tweet_id: Option<&str>,
    ) -> AppResult<u64> {
        let mut query = Notification::delete_many()
            .filter(notification::Column::RecipientId.eq(recipient_id))
            .filter(notification::Column::ActorId.eq(actor_id))
            .filter(notification::Column::NotificationType.eq(notification_type));

        query = match tweet_id {
            Some(id) => query.filter(notification::Column::TweetId.eq(id)),
            None => query.filter(notification::Column::TweetId.is_null()),
        };

        let result = query.exec(self.db.as_ref()).await.map_err(db_error)?;
        Ok(result.rows_affected)
    }
}
