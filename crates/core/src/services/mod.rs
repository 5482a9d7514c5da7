//! Business logic services.

#![allow(missing_docs)]

pub mod following;
pub mod like;
pub mod notification;
pub mod retweet;
pub mod search;
pub mod timeline;
pub mod trend;
pub mod tweet;
pub mod user;

pub use following::FollowingService;
pub use like::LikeService;
pub use notification::NotificationService;
pub use retweet::RetweetService;
pub use search::{SearchHit, SearchKind, SearchService};
pub use timeline::TimelineService;
pub use trend::{TrendService, UpsertTrendInput};
pub use tweet::{CreateTweetInput, TweetService};
pub use user::{LoginInput, RegisterInput, UpdatePasswordInput, UpdateProfileInput, UserService};
