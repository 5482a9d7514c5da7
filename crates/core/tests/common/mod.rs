//! Shared setup for service tests: every service wired to one in-memory
//! database and a manual clock.

#![allow(dead_code, clippy::unwrap_used)]

use std::sync::Arc;

use chirp_common::{Clock, ManualClock, SharedClock, TimelineConfig, TrendsConfig};
use chirp_core::{
    CreateTweetInput, FollowingService, LikeService, NotificationService, RetweetService,
    SearchService, TimelineService, TrendService, TweetHydrator, TweetService, TweetView,
    UserService,
};
use chirp_db::{
    entities::user,
    repositories::{
        FollowingRepository, NotificationRepository, TrendRepository, TweetLikeRepository,
        TweetRepository, UserRepository,
    },
    test_utils::TestDatabase,
};
use sea_orm::{DatabaseConnection, Set};

pub struct Harness {
    pub db: Arc<DatabaseConnection>,
    pub clock: Arc<ManualClock>,
    pub user_repo: UserRepository,
    pub tweet_repo: TweetRepository,
    pub users: UserService,
    pub tweets: TweetService,
    pub likes: LikeService,
    pub retweets: RetweetService,
    pub following: FollowingService,
    pub notifications: NotificationService,
    pub timeline: TimelineService,
    pub search: SearchService,
    pub trends: TrendService,
}

impl Harness {
    pub async fn new() -> Self {
        let db = TestDatabase::in_memory().await.unwrap().connection();
        let clock = Arc::new(ManualClock::default());
        let shared: SharedClock = clock.clone();

        let user_repo = UserRepository::new(Arc::clone(&db));
        let tweet_repo = TweetRepository::new(Arc::clone(&db));
        let like_repo = TweetLikeRepository::new(Arc::clone(&db));
        let following_repo = FollowingRepository::new(Arc::clone(&db));
        let notification_repo = NotificationRepository::new(Arc::clone(&db));
        let trend_repo = TrendRepository::new(Arc::clone(&db));

        let hydrator = TweetHydrator::new(tweet_repo.clone(), like_repo.clone(), user_repo.clone());
        let notifications =
            NotificationService::new(notification_repo, user_repo.clone(), Arc::clone(&shared));
        let timeline_config = TimelineConfig::default();

        Self {
            users: UserService::new(user_repo.clone(), following_repo.clone(), Arc::clone(&shared)),
            tweets: TweetService::new(
                tweet_repo.clone(),
                notifications.clone(),
                hydrator.clone(),
                Arc::clone(&shared),
            ),
            likes: LikeService::new(
                like_repo,
                tweet_repo.clone(),
                notifications.clone(),
                hydrator.clone(),
                Arc::clone(&shared),
            ),
            retweets: RetweetService::new(
                tweet_repo.clone(),
                notifications.clone(),
                hydrator.clone(),
                Arc::clone(&shared),
            ),
            following: FollowingService::new(
                following_repo.clone(),
                user_repo.clone(),
                notifications.clone(),
                Arc::clone(&shared),
            ),
            timeline: TimelineService::new(
                tweet_repo.clone(),
                following_repo,
                user_repo.clone(),
                hydrator.clone(),
                timeline_config,
            ),
            search: SearchService::new(
                user_repo.clone(),
                tweet_repo.clone(),
                hydrator,
                timeline_config,
            ),
            trends: TrendService::new(trend_repo, TrendsConfig::default(), shared),
            notifications,
            user_repo,
            tweet_repo,
            clock,
            db,
        }
    }

    /// Insert an account directly, skipping password hashing.
    pub async fn user(&self, username: &str) -> user::Model {
        self.user_repo
            .create(user::ActiveModel {
                id: Set(format!("id_{}", username.to_lowercase())),
                username: Set(username.to_string()),
                username_lower: Set(username.to_lowercase()),
                email: Set(format!("{}@example.com", username.to_lowercase())),
                password: Set("unused".to_string()),
                token: Set(format!("token_{}", username.to_lowercase())),
                name: Set(format!("{username} Display")),
                name_lower: Set(format!("{} display", username.to_lowercase())),
                followers_count: Set(0),
                following_count: Set(0),
                created_at: Set(self.clock.now()),
                ..Default::default()
            })
            .await
            .unwrap()
    }

    pub async fn post(&self, author: &user::Model, content: &str) -> TweetView {
        self.tweets
            .post(
                &author.id,
                CreateTweetInput {
                    content: content.to_string(),
                    image: None,
                },
            )
            .await
            .unwrap()
    }

    pub async fn reload(&self, user: &user::Model) -> user::Model {
        self.user_repo.get_by_id(&user.id).await.unwrap()
    }

    pub async fn unread(&self, user: &user::Model) -> u64 {
        self.notifications.unread_count(&user.id).await.unwrap()
    }
}
