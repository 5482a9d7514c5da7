//! API endpoints.

mod auth;
mod discover;
mod following;
mod metrics;
mod notifications;
mod tweets;
mod users;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(discover::router())
        .nest("/tweets", tweets::router())
        .nest("/users", users::router())
        .nest("/following", following::router())
        .nest("/notifications", notifications::router())
        .nest("/metrics", metrics::router())
}
