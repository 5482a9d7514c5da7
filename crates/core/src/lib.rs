//! Core business logic for chirp.

pub mod services;
pub mod views;

pub use services::*;
pub use views::{
    MeView, NotificationView, Page, RankedPage, TrendView, TweetDetail, TweetHydrator, TweetView,
    UserProfile, UserSummary,
};
