//! Trend repository.

use std::sync::Arc;

use super::db_error;
use crate::entities::{Trend, trend};
use chirp_common::AppResult;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};

/// Trend repository for database operations.
#[derive(Clone)]
pub struct TrendRepository {
    db: Arc<DatabaseConnection>,
}

impl TrendRepository {
    /// Create a new trend repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Top trends by tweet count, then newest, then ID.
    pub async fn find_top(&self, limit: u64) -> AppResult<Vec<trend::Model>> {
        Trend::find()
            .order_by_desc(trend::Column::TweetCount)
            .order_by_desc(trend::Column::CreatedAt)
            .order_by_desc(trend::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Find a trend by topic.
    pub async fn find_by_topic(&self, topic: &str) -> AppResult<Option<trend::Model>> {
        Trend::find()
            .filter(trend::Column::Topic.eq(topic))
            .one(self.db.as_ref())
            .await
            .map_err(db_error)
    }

    /// Create a new trend.
    pub async fn create(&self, model: trend::ActiveModel) -> AppResult<trend::Model> {
        model.insert(self.db.as_ref()).await.map_err(db_error)
    }

    /// Overwrite the externally maintained fields of an existing trend.
    pub async fn update_counts(
        &self,
        existing: trend::Model,
        tweet_count: i64,
        location: String,
        promoted: bool,
    ) -> AppResult<trend::Model> {
        let mut active = existing.into_active_model();
        active.tweet_count = Set(tweet_count);
        active.location = Set(location);
        active.promoted = Set(promoted);
        active.update(self.db.as_ref()).await.map_err(db_error)
    }

    /// Count all trends.
    pub async fn count(&self) -> AppResult<u64> {
        Trend::find().count(self.db.as_ref()).await.map_err(db_error)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_trend(id: &str, topic: &str, tweet_count: i64) -> trend::Model {
        trend::Model {
            id: id.to_string(),
            topic: topic.to_string(),
            tweet_count,
            location: "Worldwide".to_string(),
            promoted: false,
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_top() {
        let rust = create_test_trend("tr1", "#Rust", 900);
        let axum = create_test_trend("tr2", "#Axum", 300);

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([[rust.clone(), axum.clone()]])
            .into_connection();

        let repo = TrendRepository::new(Arc::new(db));
        let result = repo.find_top(5).await.unwrap();

        assert_eq!(result, vec![rust, axum]);
    }

    #[tokio::test]
    async fn test_find_by_topic_missing() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([Vec::<trend::Model>::new()])
            .into_connection();

        let repo = TrendRepository::new(Arc::new(db));
        assert!(repo.find_by_topic("#Nope").await.unwrap().is_none());
    }
}
