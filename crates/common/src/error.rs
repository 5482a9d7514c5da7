//! Error types for chirp.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// A duplicate engagement action, or undoing one that was never done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConflictKind {
    #[error("you have already liked this tweet")]
    AlreadyLiked,
    #[error("you have not liked this tweet")]
    NotLiked,
    #[error("you have already retweeted this tweet")]
    AlreadyRetweeted,
    #[error("you have not retweeted this tweet")]
    NotRetweeted,
    #[error("you are already following this user")]
    AlreadyFollowing,
    #[error("you are not following this user")]
    NotFollowing,
    #[error("you cannot follow yourself")]
    SelfFollow,
    #[error("username is already taken")]
    UsernameTaken,
    #[error("email is already registered")]
    EmailTaken,
}

impl ConflictKind {
    /// Machine-readable code used in API responses.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::AlreadyLiked => "ALREADY_LIKED",
            Self::NotLiked => "NOT_LIKED",
            Self::AlreadyRetweeted => "ALREADY_RETWEETED",
            Self::NotRetweeted => "NOT_RETWEETED",
            Self::AlreadyFollowing => "ALREADY_FOLLOWING",
            Self::NotFollowing => "NOT_FOLLOWING",
            Self::SelfFollow => "SELF_FOLLOW",
            Self::UsernameTaken => "USERNAME_TAKEN",
            Self::EmailTaken => "EMAIL_TAKEN",
        }
    }
}

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Tweet not found: {0}")]
    TweetNotFound(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(ConflictKind),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            // 4xx Client Errors
            Self::NotFound(_) | Self::UserNotFound(_) | Self::TweetNotFound(_) => {
                StatusCode::NOT_FOUND
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) | Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(ConflictKind::SelfFollow) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,

            // 5xx Server Errors
            Self::Database(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Returns the error code for API responses.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::UserNotFound(_) => "USER_NOT_FOUND",
            Self::TweetNotFound(_) => "TWEET_NOT_FOUND",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(kind) => kind.code(),
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }

    /// Returns the conflict kind if this is a conflict error.
    #[must_use]
    pub const fn conflict_kind(&self) -> Option<ConflictKind> {
        match self {
            Self::Conflict(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl From<ConflictKind> for AppError {
    fn from(kind: ConflictKind) -> Self {
        Self::Conflict(kind)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.error_code();

        if self.is_server_error() {
            tracing::error!(error = %self, code = code, "Server error occurred");
        } else {
            tracing::debug!(error = %self, code = code, "Client error occurred");
        }

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflict_status_codes() {
        assert_eq!(
            AppError::Conflict(ConflictKind::AlreadyLiked).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Conflict(ConflictKind::SelfFollow).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_conflict_error_code() {
        let err = AppError::from(ConflictKind::NotRetweeted);
        assert_eq!(err.error_code(), "NOT_RETWEETED");
        assert_eq!(err.conflict_kind(), Some(ConflictKind::NotRetweeted));
        assert!(!err.is_server_error());
    }

    #[test]
    fn test_database_error_is_server_error() {
        let err = AppError::Database("connection reset".to_string());
        assert!(err.is_server_error());
        assert_eq!(err.conflict_kind(), None);
    }
}
