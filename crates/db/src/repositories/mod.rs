//! Repositories wrapping all database access.

pub mod following;
pub mod notification;
pub mod trend;
pub mod tweet;
pub mod tweet_like;
pub mod user;

pub use following::FollowingRepository;
pub use notification::NotificationRepository;
pub use trend::TrendRepository;
pub use tweet::TweetRepository;
pub use tweet_like::TweetLikeRepository;
pub use user::UserRepository;

use chirp_common::AppError;
use sea_orm::{DbErr, SqlErr};

pub(crate) fn db_error(e: DbErr) -> AppError {
    AppError::Database(e.to_string())
}

pub(crate) fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

pub(crate) fn is_foreign_key_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::ForeignKeyConstraintViolation(_)))
}

/// `%pattern%` for a case-insensitive `LIKE`, with wildcards in the input escaped.
pub(crate) fn contains_pattern(query: &str) -> String {
    let escaped = query
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("Hello"), "%hello%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("snake_case"), "%snake\\_case%");
    }
}
