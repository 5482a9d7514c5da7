//! Test utilities for database operations.
//!
//! Provides a migrated, throwaway database for service and API tests.

use std::sync::Arc;

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use tracing::info;

/// A migrated database that lives as long as this value.
pub struct TestDatabase {
    /// Database connection.
    pub conn: Arc<DatabaseConnection>,
}

impl TestDatabase {
    /// Create a fresh in-memory SQLite database with all migrations applied.
    ///
    /// The pool is pinned to a single connection that never expires: every
    /// connection to `sqlite::memory:` opens a separate, empty database.
    pub async fn in_memory() -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new("sqlite::memory:");
        opt.max_connections(1)
            .min_connections(1)
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;
        Self::migrated(conn).await
    }

    /// Connect to an existing database URL (e.g. `TEST_DATABASE_URL`) and
    /// apply migrations.
    pub async fn with_url(url: &str) -> Result<Self, DbErr> {
        let conn = Database::connect(url).await?;
        Self::migrated(conn).await
    }

    async fn migrated(conn: DatabaseConnection) -> Result<Self, DbErr> {
        use sea_orm_migration::MigratorTrait;
        crate::migrations::Migrator::up(&conn, None).await?;

        info!("Migrated test database");

        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Get the database connection.
    #[must_use]
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        Arc::clone(&self.conn)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::entities::{Trend, trend};
    use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

    #[tokio::test]
    async fn test_in_memory_is_migrated_and_isolated() {
        let first = TestDatabase::in_memory().await.unwrap();
        let second = TestDatabase::in_memory().await.unwrap();

        trend::ActiveModel {
            id: Set("tr1".to_string()),
            topic: Set("#Rust".to_string()),
            tweet_count: Set(10),
            location: Set("Worldwide".to_string()),
            promoted: Set(false),
            created_at: Set(chirp_common::clock::from_millis(0)),
        }
        .insert(first.conn.as_ref())
        .await
        .unwrap();

        assert_eq!(Trend::find().count(first.conn.as_ref()).await.unwrap(), 1);
        assert_eq!(Trend::find().count(second.conn.as_ref()).await.unwrap(), 0);
    }
}
