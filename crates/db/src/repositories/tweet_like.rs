//! Tweet like repository.

use std::sync::Arc;

use super::{db_error, is_foreign_key_violation, is_unique_violation};
use crate::entities::{TweetLike, tweet_like};
use chirp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};

/// Like repository. The unique `(tweet_id, user_id)` index makes [`Self::insert`]
/// a conditional set-add.
#[derive(Clone)]
pub struct TweetLikeRepository {
    db: Arc<DatabaseConnection>,
}

impl TweetLikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Add a like. Returns `false` if the user already liked the tweet.
    pub async fn insert(&self, model: tweet_like::ActiveModel) -> AppResult<bool> {
        let tweet_id = model.tweet_id.clone().take().unwrap_or_default();

        match model.insert(self.db.as_ref()).await {
            Ok(_) => Ok(true),
            Err(e) if is_unique_violation(&e) => Ok(false),
            Err(e) if is_foreign_key_violation(&e) => Err(AppError::TweetNotFound(tweet_id)),
            Err(e) => Err(db_error(e)),
        }
    }

    /// Remove a like. Returns `false` if there was nothing to remove.
    pub async fn delete_by_pair(&self, tweet_id: &str, user_id: &str) -> AppResult<bool> {
        let result = TweetLike::delete_many()
            .filter(tweet_like::Column::TweetId.eq(tweet_id))
            .filter(tweet_like::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected > 0)
    }

    /// Check whether a user has liked a tweet.
    pub async fn is_liked(&self, tweet_id: &str, user_id: &str) -> AppResult<bool> {
        let count = TweetLike::find()
            .filter(tweet_like::Column::TweetId.eq(tweet_id))
            .filter(tweet_like::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count > 0)
    }

    /// Likes on any of the given tweets, oldest first.
    pub async fn find_by_tweets(&self, tweet_ids: &[String]) -> AppResult<Vec<tweet_like::Model>> {
        if tweet_ids.is_empty() {
            return Ok(vec![]);
        }

        TweetLike::find()
            .filter(tweet_like::Column::TweetId.is_in(tweet_ids.iter().cloned()))
            .order_by_asc(tweet_like::Column::CreatedAt)
            .order_by_asc(tweet_like::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Count likes on a tweet.
    pub async fn count_by_tweet(&self, tweet_id: &str) -> AppResult<u64> {
        TweetLike::find()
            .filter(tweet_like::Column::TweetId.eq(tweet_id))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_like(id: &str, tweet_id: &str, user_id: &str) -> tweet_like::Model {
        tweet_like::Model {
            id: id.to_string(),
            tweet_id: tweet_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_delete_by_pair_reports_absence() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let repo = TweetLikeRepository::new(Arc::new(db));
        assert!(!repo.delete_by_pair("t1", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_by_pair_removes_row() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .into_connection();

        let repo = TweetLikeRepository::new(Arc::new(db));
        assert!(repo.delete_by_pair("t1", "u1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_tweets() {
        let like1 = create_test_like("l1", "t1", "u1");
        let like2 = create_test_like("l2", "t1", "u2");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[like1.clone(), like2.clone()]])
            .into_connection();

        let repo = TweetLikeRepository::new(Arc::new(db));
        let result = repo.find_by_tweets(&["t1".to_string()]).await.unwrap();

        assert_eq!(result, vec![like1, like2]);
    }
}
