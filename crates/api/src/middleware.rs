//! API middleware and shared state.

#![allow(missing_docs)]

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};
use chirp_common::{Config, SharedClock, TimelineConfig, Timer, get_metrics};
use chirp_core::{
    FollowingService, LikeService, NotificationService, RetweetService, SearchService,
    TimelineService, TrendService, TweetHydrator, TweetService, UserService,
};
use chirp_db::repositories::{
    FollowingRepository, NotificationRepository, TrendRepository, TweetLikeRepository,
    TweetRepository, UserRepository,
};
use sea_orm::DatabaseConnection;

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub tweet_service: TweetService,
    pub like_service: LikeService,
    pub retweet_service: RetweetService,
    pub following_service: FollowingService,
    pub notification_service: NotificationService,
    pub timeline_service: TimelineService,
    pub search_service: SearchService,
    pub trend_service: TrendService,
    pub timeline: TimelineConfig,
}

impl AppState {
    /// Wire every repository and service onto one connection pool.
    #[must_use]
    pub fn new(db: &Arc<DatabaseConnection>, config: &Config, clock: &SharedClock) -> Self {
        let user_repo = UserRepository::new(Arc::clone(db));
        let tweet_repo = TweetRepository::new(Arc::clone(db));
        let like_repo = TweetLikeRepository::new(Arc::clone(db));
        let following_repo = FollowingRepository::new(Arc::clone(db));
        let notification_repo = NotificationRepository::new(Arc::clone(db));
        let trend_repo = TrendRepository::new(Arc::clone(db));

        let hydrator = TweetHydrator::new(tweet_repo.clone(), like_repo.clone(), user_repo.clone());
        let notification_service =
            NotificationService::new(notification_repo, user_repo.clone(), Arc::clone(clock));

        Self {
            user_service: UserService::new(
                user_repo.clone(),
                following_repo.clone(),
                Arc::clone(clock),
            ),
            tweet_service: TweetService::new(
                tweet_repo.clone(),
                notification_service.clone(),
                hydrator.clone(),
                Arc::clone(clock),
            ),
            like_service: LikeService::new(
                like_repo,
                tweet_repo.clone(),
                notification_service.clone(),
                hydrator.clone(),
                Arc::clone(clock),
            ),
            retweet_service: RetweetService::new(
                tweet_repo.clone(),
                notification_service.clone(),
                hydrator.clone(),
                Arc::clone(clock),
            ),
            following_service: FollowingService::new(
                following_repo.clone(),
                user_repo.clone(),
                notification_service.clone(),
                Arc::clone(clock),
            ),
            timeline_service: TimelineService::new(
                tweet_repo.clone(),
                following_repo,
                user_repo.clone(),
                hydrator.clone(),
                config.timeline,
            ),
            search_service: SearchService::new(user_repo, tweet_repo, hydrator, config.timeline),
            trend_service: TrendService::new(trend_repo, config.trends, Arc::clone(clock)),
            notification_service,
            timeline: config.timeline,
        }
    }
}

/// Authentication middleware.
///
/// Resolves `Authorization: Bearer <token>` into the user and stores it in the
/// request extensions. Requests without a valid token pass through anonymous.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get(header::AUTHORIZATION)
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.user_service.authenticate_by_token(token.trim()).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(e) => tracing::debug!(error = %e, "Ignoring invalid bearer token"),
        }
    }

    next.run(req).await
}

/// Count every response by status class and latency.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let timer = Timer::start();
    let response = next.run(req).await;
    get_metrics().record_http_request(response.status().as_u16(), timer.elapsed());
    response
}
