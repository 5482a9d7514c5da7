//! User repository.

use std::sync::Arc;

use super::{contains_pattern, db_error, is_unique_violation};
use crate::entities::{User, following, user};
use chirp_common::{AppError, AppResult, ConflictKind};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait,
    sea_query::{Expr, LikeExpr},
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find users by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<user::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        User::find()
            .filter(user::Column::Id.is_in(ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a user by handle (case-insensitive).
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::UsernameLower.eq(username.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Get a user by handle, returning an error if not found.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a user by access token.
    pub async fn find_by_token(&self, token: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Token.eq(token))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a new user.
    ///
    /// A lost race on the handle or email surfaces as the matching conflict.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.insert(self.db.as_ref()).await.map_err(|e| {
            if is_unique_violation(&e) {
                if e.to_string().contains("email") {
                    AppError::Conflict(ConflictKind::EmailTaken)
                } else {
                    AppError::Conflict(ConflictKind::UsernameTaken)
                }
            } else {
                db_error(e)
            }
        })
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Case-insensitive substring match on handle or display name.
    pub async fn search(&self, query: &str, limit: u64) -> AppResult<Vec<user::Model>> {
        let pattern = contains_pattern(query);

        User::find()
            .filter(
                Condition::any()
                    .add(
                        Expr::col(user::Column::UsernameLower)
                            .like(LikeExpr::new(pattern.clone()).escape('\\')),
                    )
                    .add(
                        Expr::col(user::Column::NameLower)
                            .like(LikeExpr::new(pattern).escape('\\')),
                    ),
            )
            .order_by_desc(user::Column::FollowersCount)
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Users other than `viewer_id` that `viewer_id` does not follow.
    /// Anonymous viewers get the most-followed users.
    pub async fn find_suggestions(
        &self,
        viewer_id: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<user::Model>> {
        let mut query = User::find();

        if let Some(viewer_id) = viewer_id {
            let followed = crate::entities::Following::find()
                .select_only()
                .column(following::Column::FolloweeId)
                .filter(following::Column::FollowerId.eq(viewer_id))
                .into_query();

            query = query
                .filter(user::Column::Id.ne(viewer_id))
                .filter(user::Column::Id.not_in_subquery(followed));
        }

        query
            .order_by_desc(user::Column::FollowersCount)
            .order_by_desc(user::Column::CreatedAt)
            .order_by_desc(user::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Count all users.
    pub async fn count(&self) -> AppResult<u64> {
        User::find().count(self.db.as_ref()).await.map_err(db_error)
    }
}
