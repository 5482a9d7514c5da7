//! Following repository.

use std::sync::Arc;

use super::{db_error, is_foreign_key_violation, is_unique_violation};
use crate::entities::{Following, User, following, user};
use chirp_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, IdenStatic,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait, sea_query::Expr,
};

/// Following repository for database operations.
///
/// Each edge row is both sides of the relationship: it places the followee in
/// the follower's `following` set and the follower in the followee's
/// `followers` set. Both users' counters move in the same transaction as the
/// row.
#[derive(Clone)]
pub struct FollowingRepository {
    db: Arc<DatabaseConnection>,
}

impl FollowingRepository {
    /// Create a new following repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a following relationship by follower and followee.
    pub async fn find_by_pair(
        &self,
        follower_id: &str,
        followee_id: &str,
    ) -> AppResult<Option<following::Model>> {
        Following::find()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::FolloweeId.eq(followee_id))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Check if a user is following another user.
    pub async fn is_following(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        Ok(self.find_by_pair(follower_id, followee_id).await?.is_some())
    }

    /// Insert a follow edge and bump both counters.
    ///
    /// Returns `false` if the edge already exists.
    pub async fn create_edge(&self, model: following::ActiveModel) -> AppResult<bool> {
        let follower_id = model.follower_id.clone().take().unwrap_or_default();
        let followee_id = model.followee_id.clone().take().unwrap_or_default();

        let txn = self.db.begin().await.map_err(db_error)?;

        match model.insert(&txn).await {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Ok(false),
            Err(e) if is_foreign_key_violation(&e) => {
                return Err(AppError::UserNotFound(followee_id));
            }
            Err(e) => return Err(db_error(e)),
        }

        increment_count(&txn, &follower_id, user::Column::FollowingCount).await?;
        increment_count(&txn, &followee_id, user::Column::FollowersCount).await?;

        txn.commit().await.map_err(db_error)?;
        Ok(true)
    }

    /// Remove a follow edge and lower both counters.
    ///
    /// Returns `false` if there was no edge.
    pub async fn delete_edge(&self, follower_id: &str, followee_id: &str) -> AppResult<bool> {
        let txn = self.db.begin().await.map_err(db_error)?;

        let result = Following::delete_many()
            .filter(following::Column::FollowerId.eq(follower_id))
            .filter(following::Column::FolloweeId.eq(followee_id))
            .exec(&txn)
            .await
            .map_err(db_error)?;

        if result.rows_affected == 0 {
            return Ok(false);
        }

        decrement_count(&txn, follower_id, user::Column::FollowingCount).await?;
        decrement_count(&txn, followee_id, user::Column::FollowersCount).await?;

        txn.commit().await.map_err(db_error)?;
        Ok(true)
    }

    /// IDs of every user that `user_id` follows.
    pub async fn find_followee_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        Following::find()
            .select_only()
            .column(following::Column::FolloweeId)
            .filter(following::Column::FollowerId.eq(user_id))
            .into_tuple()
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Edges where `user_id` is the follower, newest first.
    pub async fn find_following(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<following::Model>> {
        Following::find()
            .filter(following::Column::FollowerId.eq(user_id))
            .order_by_desc(following::Column::CreatedAt)
            .order_by_desc(following::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Edges where `user_id` is the followee, newest first.
    pub async fn find_followers(
        &self,
        user_id: &str,
        limit: u64,
        offset: u64,
    ) -> AppResult<Vec<following::Model>> {
        Following::find()
            .filter(following::Column::FolloweeId.eq(user_id))
            .order_by_desc(following::Column::CreatedAt)
            .order_by_desc(following::Column::Id)
            .limit(limit)
            .offset(offset)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Count followers of a user.
    pub async fn count_followers(&self, user_id: &str) -> AppResult<u64> {
        Following::find()
            .filter(following::Column::FolloweeId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Count following of a user.
    pub async fn count_following(&self, user_id: &str) -> AppResult<u64> {
        Following::find()
            .filter(following::Column::FollowerId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Rebuild a user's follower/following counters from edge rows.
    pub async fn recount(&self, user_id: &str) -> AppResult<(u64, u64)> {
        let followers = self.count_followers(user_id).await?;
        let following = self.count_following(user_id).await?;

        User::update_many()
            .col_expr(user::Column::FollowersCount, Expr::value(followers as i32))
            .col_expr(user::Column::FollowingCount, Expr::value(following as i32))
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(db_error)?;

        Ok((followers, following))
    }
}

async fn increment_count<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    column: user::Column,
) -> AppResult<()> {
    User::update_many()
        .col_expr(column, Expr::col(column).add(1))
        .filter(user::Column::Id.eq(user_id))
        .exec(conn)
        .await
        .map_err(db_error)?;
    Ok(())
}

async fn decrement_count<C: ConnectionTrait>(
    conn: &C,
    user_id: &str,
    column: user::Column,
) -> AppResult<()> {
    let name = column.as_str();

    User::update_many()
        .col_expr(
            column,
            Expr::cust(format!("CASE WHEN {name} > 0 THEN {name} - 1 ELSE 0 END")),
        )
        .filter(user::Column::Id.eq(user_id))
        .exec(conn)
        .await
        .map_err(db_error)?;
    Ok(())
}
