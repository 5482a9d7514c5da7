//! Tweet repository.

use std::sync::Arc;

use super::{contains_pattern, db_error, is_foreign_key_violation, is_unique_violation};
use crate::entities::{Notification, Tweet, TweetLike, notification, tweet, tweet_like};
use crate::pagination::Cursor;
use chirp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
    sea_query::{Expr, LikeExpr},
};

/// Number of likes on the outer `tweet` row, for ranking.
const LIKE_COUNT_EXPR: &str =
    "(SELECT COUNT(*) FROM tweet_like WHERE tweet_like.tweet_id = tweet.id)";

/// Tweet repository for database operations.
///
/// Retweet records and the original's `retweet_count` only change together,
/// inside [`Self::create_retweet`], [`Self::delete_retweet`] and
/// [`Self::delete_with_dependents`].
#[derive(Clone)]
pub struct TweetRepository {
    db: Arc<DatabaseConnection>,
}

impl TweetRepository {
    /// Create a new tweet repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a tweet by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<tweet::Model>> {
        Tweet::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a tweet by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<tweet::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::TweetNotFound(id.to_string()))
    }

    /// Find tweets by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<tweet::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Tweet::find()
            .filter(tweet::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a root tweet or a reply.
    pub async fn create(&self, model: tweet::ActiveModel) -> AppResult<tweet::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Find the retweet record a user owns for an original.
    pub async fn find_retweet(
        &self,
        user_id: &str,
        original_id: &str,
    ) -> AppResult<Option<tweet::Model>> {
        Tweet::find()
            .filter(tweet::Column::UserId.eq(user_id))
            .filter(tweet::Column::OriginalTweetId.eq(original_id))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Retweet records pointing at any of the given originals, oldest first.
    pub async fn find_retweets_of(&self, original_ids: &[String]) -> AppResult<Vec<tweet::Model>> {
        if original_ids.is_empty() {
            return Ok(vec![]);
        }

        Tweet::find()
            .filter(tweet::Column::OriginalTweetId.is_in(original_ids.iter().cloned()))
            .order_by_asc(tweet::Column::CreatedAt)
            .order_by_asc(tweet::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Count retweet records pointing at an original.
    pub async fn count_retweets_of(&self, original_id: &str) -> AppResult<u64> {
        Tweet::find()
            .filter(tweet::Column::OriginalTweetId.eq(original_id))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Insert a retweet record and bump the original's `retweet_count` in one
    /// transaction.
    ///
    /// Returns `None` when the user already has a retweet record for the
    /// original.
    pub async fn create_retweet(
        &self,
        record: tweet::ActiveModel,
        original_id: &str,
    ) -> AppResult<Option<tweet::Model>> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let created = match record.insert(&txn).await {
            Ok(model) => model,
            Err(e) if is_unique_violation(&e) => return Ok(None),
            Err(e) if is_foreign_key_violation(&e) => {
                return Err(AppError::TweetNotFound(original_id.to_string()));
            }
            Err(e) => return Err(db_error(e)),
        };

        Tweet::update_many()
            .col_expr(
                tweet::Column::RetweetCount,
                Expr::col(tweet::Column::RetweetCount).add(1),
            )
            .filter(tweet::Column::Id.eq(original_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        txn.commit().await.map_err(db_error)?;
        Ok(Some(created))
    }

    /// Remove a user's retweet record for an original and lower the
    /// original's `retweet_count` (never below zero) in one transaction.
    ///
    /// Notifications about the record and likes of it go with it. Returns the
    /// removed record, or `None` if the user had no retweet record.
    pub async fn delete_retweet(
        &self,
        user_id: &str,
        original_id: &str,
    ) -> AppResult<Option<tweet::Model>> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let Some(record) = Tweet::find()
            .filter(tweet::Column::UserId.eq(user_id))
            .filter(tweet::Column::OriginalTweetId.eq(original_id))
            .one(&txn)
            .await
            .map_err(db_error)?
        else {
            return Ok(None);
        };

        let ids = vec![record.id.clone()];
        delete_engagements(&txn, &ids).await?;

        let deleted = Tweet::delete_many()
            .filter(tweet::Column::Id.eq(&record.id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        if deleted.rows_affected == 0 {
            return Ok(None);
        }

        decrement_retweet_count(&txn, original_id).await?;

        txn.commit().await.map_err(db_error)?;
        Ok(Some(record))
    }

    /// Delete a tweet together with everything that only exists because of it:
    /// its retweet records, likes of the tweet and of those records, and
    /// notifications whose subject is any of them. Deleting a retweet record
    /// lowers its original's `retweet_count`. Replies are left in place.
    ///
    /// Returns the IDs of all removed tweet rows.
    pub async fn delete_with_dependents(&self, tweet: &tweet::Model) -> AppResult<Vec<String>> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let mut ids: Vec<String> = Tweet::find()
            .select_only()
            .column(tweet::Column::Id)
            .filter(tweet::Column::OriginalTweetId.eq(&tweet.id))
            .into_tuple()
            .all(&txn)
            .await
            .map_err(db_error)?;
        ids.push(tweet.id.clone());

        delete_engagements(&txn, &ids).await?;

        Tweet::delete_many()
            .filter(tweet::Column::OriginalTweetId.eq(&tweet.id))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        let deleted = Tweet::delete_many()
            .filter(tweet::Column::Id.eq(&tweet.id))
            .exec(&txn)
            .await
            .map_err(db_error)?;
        if deleted.rows_affected == 0 {
            return Err(AppError::TweetNotFound(tweet.id.clone()));
        }

        if let Some(original_id) = &tweet.original_tweet_id {
            decrement_retweet_count(&txn, original_id).await?;
        }

        txn.commit().await.map_err(db_error)?;
        Ok(ids)
    }

    /// Rebuild an original's `retweet_count` from its retweet records.
    pub async fn recount_retweets(&self, original_id: &str) -> AppResult<u64> {
        let count = self.count_retweets_of(original_id).await?;

        Tweet::update_many()
            .col_expr(tweet::Column::RetweetCount, Expr::value(count as i32))
            .filter(tweet::Column::Id.eq(original_id))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok(count)
    }

    /// Tweets authored by one user, newest first.
    pub async fn find_by_user(
        &self,
        user_id: &str,
        limit: u64,
        cursor: Option<&Cursor>,
    ) -> AppResult<Vec<tweet::Model>> {
        self.find_chronological(
            Condition::all().add(tweet::Column::UserId.eq(user_id)),
            limit,
            cursor,
        )
        .await
    }

    /// Tweets authored by any of the given users, newest first.
    pub async fn find_by_users(
        &self,
        user_ids: &[String],
        limit: u64,
        cursor: Option<&Cursor>,
    ) -> AppResult<Vec<tweet::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        self.find_chronological(
            Condition::all().add(tweet::Column::UserId.is_in(user_ids.iter().cloned())),
            limit,
            cursor,
        )
        .await
    }

    /// All tweets, or only replies to one tweet, newest first.
    pub async fn find_all(
        &self,
        reply_to: Option<&str>,
        limit: u64,
        cursor: Option<&Cursor>,
    ) -> AppResult<Vec<tweet::Model>> {
        let mut condition = Condition::all();
        if let Some(parent) = reply_to {
            condition = condition.add(tweet::Column::ReplyToId.eq(parent));
        }

        self.find_chronological(condition, limit, cursor).await
    }

    async fn find_chronological(
        &self,
        mut condition: Condition,
        limit: u64,
        cursor: Option<&Cursor>,
    ) -> AppResult<Vec<tweet::Model>> {
        if let Some(cursor) = cursor {
            condition = condition.add(cursor.older_than(tweet::Column::CreatedAt, tweet::Column::Id));
        }

        Tweet::find()
            .filter(condition)
            .order_by_desc(tweet::Column::CreatedAt)
            .order_by_desc(tweet::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Direct replies to a tweet, newest first.
    pub async fn find_replies(&self, tweet_id: &str, limit: u64) -> AppResult<Vec<tweet::Model>> {
        self.find_all(Some(tweet_id), limit, None).await
    }

    /// All tweets ranked by popularity: retweet count, then like count, then
    /// recency, then ID. A total order, so offsets are stable.
    pub async fn find_explore(&self, limit: u64, offset: u64) -> AppResult<Vec<tweet::Model>> {
        Tweet::find()
            .order_by_desc(tweet::Column::RetweetCount)
            .order_by(Expr::cust(LIKE_COUNT_EXPR), Order::Desc)
            .order_by_desc(tweet::Column::CreatedAt)
            .order_by_desc(tweet::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Case-insensitive substring match on tweet body, newest first.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<tweet::Model>> {
        let pattern = contains_pattern(query);

        Tweet::find()
            .filter(
                Expr::col(tweet::Column::ContentLower)
                    .like(LikeExpr::new(pattern).escape('\\')),
            )
            .order_by_desc(tweet::Column::CreatedAt)
            .order_by_desc(tweet::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }
}

/// Delete likes of, and notifications about, the given tweets.
async fn delete_engagements<C: ConnectionTrait>(conn: &C, tweet_ids: &[String]) -> AppResult<()> {
    Notification::delete_many()
        .filter(notification::Column::TweetId.is_in(tweet_ids.iter().cloned()))
        .exec(conn)
        .await
        .map_err(db_error)?;

    TweetLike::delete_many()
        .filter(tweet_like::Column::TweetId.is_in(tweet_ids.iter().cloned()))
        .exec(conn)
        .await
        .map_err(db_error)?;

    Ok(())
}

async fn decrement_retweet_count<C: ConnectionTrait>(conn: &C, original_id: &str) -> AppResult<()> {
    Tweet::update_many()
        .col_expr(
            tweet::Column::RetweetCount,
            Expr::cust("CASE WHEN retweet_count > 0 THEN retweet_count - 1 ELSE 0 END"),
        )
        .filter(tweet::Column::Id.eq(original_id))
        .exec(conn)
        .await
        .map_err(db_error)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_tweet(id: &str, user_id: &str, content: &str) -> tweet::Model {
        tweet::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            content: content.to_string(),
            content_lower: content.to_lowercase(),
            image: None,
            reply_to_id: None,
            original_tweet_id: None,
            is_reply: false,
            is_retweet: false,
            retweet_count: 0,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_id_found() {
        let tweet = create_test_tweet("t1", "u1", "hello");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[tweet.clone()]])
            .into_connection();

        let repo = TweetRepository::new(Arc::new(db));
        let result = repo.find_by_id("t1").await.unwrap();

        assert_eq!(result, Some(tweet));
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<tweet::Model>::new()])
            .into_connection();

        let repo = TweetRepository::new(Arc::new(db));
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::TweetNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_by_users_empty_skips_query() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
        let repo = TweetRepository::new(Arc::new(db));

        assert!(repo.find_by_users(&[], 20, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_user_returns_rows_in_query_order() {
        let newer = create_test_tweet("t2", "u1", "second");
        let older = create_test_tweet("t1", "u1", "first");

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[newer.clone(), older.clone()]])
            .into_connection();

        let repo = TweetRepository::new(Arc::new(db));
        let result = repo.find_by_user("u1", 20, None).await.unwrap();

        assert_eq!(result, vec![newer, older]);
    }
}
