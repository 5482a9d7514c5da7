//! Database entities.

pub mod following;
pub mod notification;
pub mod trend;
pub mod tweet;
pub mod tweet_like;
pub mod user;

pub use following::Entity as Following;
pub use notification::Entity as Notification;
pub use trend::Entity as Trend;
pub use tweet::Entity as Tweet;
pub use tweet_like::Entity as TweetLike;
pub use user::Entity as User;
