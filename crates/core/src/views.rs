//! Read models returned by the services.
//!
//! Every tweet leaves the core as a [`TweetView`]: author profile inline, like
//! and retweet sets resolved, and for retweet records the original tweet (with
//! its own author) embedded one level deep.

use std::collections::{HashMap, HashSet};

use chirp_common::AppResult;
use chirp_db::{
    Cursor,
    entities::{notification, trend, tweet, user},
    repositories::{TweetLikeRepository, TweetRepository, UserRepository},
};
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::Serialize;

/// Public fields of a user shown next to their content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub name: String,
    pub profile_image_url: Option<String>,
}

impl From<&user::Model> for UserSummary {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            profile_image_url: user.profile_image_url.clone(),
        }
    }
}

/// Full public profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    pub name: String,
    pub bio: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub profile_image_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub followers_count: i32,
    pub following_count: i32,
    pub created_at: DateTimeWithTimeZone,
    /// Whether the viewer follows this user; absent for anonymous viewers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_following: Option<bool>,
}

impl From<&user::Model> for UserProfile {
    fn from(user: &user::Model) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            name: user.name.clone(),
            bio: user.bio.clone(),
            location: user.location.clone(),
            website: user.website.clone(),
            profile_image_url: user.profile_image_url.clone(),
            cover_image_url: user.cover_image_url.clone(),
            followers_count: user.followers_count,
            following_count: user.following_count,
            created_at: user.created_at,
            is_following: None,
        }
    }
}

/// The signed-in user's own account.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeView {
    #[serde(flatten)]
    pub profile: UserProfile,
    pub email: String,
}

impl From<&user::Model> for MeView {
    fn from(user: &user::Model) -> Self {
        Self {
            profile: UserProfile::from(user),
            email: user.email.clone(),
        }
    }
}

/// A tweet with everything a client needs to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetView {
    pub id: String,
    pub author: UserSummary,
    pub content: String,
    pub image: Option<String>,
    /// IDs of users who liked this exact record.
    pub likes: Vec<String>,
    pub like_count: usize,
    /// IDs of users owning a retweet record of this tweet.
    pub retweeted_by: Vec<String>,
    pub retweet_count: i32,
    pub reply_to: Option<String>,
    pub is_reply: bool,
    pub is_retweet: bool,
    /// The retweeted tweet, for retweet records. Never nested further.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_tweet: Option<Box<TweetView>>,
    pub created_at: DateTimeWithTimeZone,
}

/// A tweet and its direct replies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetDetail {
    pub tweet: TweetView,
    pub replies: Vec<TweetView>,
}

/// A notification with its actor inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationView {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: notification::NotificationType,
    pub actor: UserSummary,
    pub tweet_id: Option<String>,
    pub content: Option<String>,
    pub is_read: bool,
    pub created_at: DateTimeWithTimeZone,
}

/// Externally seeded trending topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendView {
    pub id: String,
    pub topic: String,
    pub tweet_count: i64,
    pub location: String,
    pub promoted: bool,
    pub created_at: DateTimeWithTimeZone,
}

impl From<trend::Model> for TrendView {
    fn from(trend: trend::Model) -> Self {
        Self {
            id: trend.id,
            topic: trend.topic,
            tweet_count: trend.tweet_count,
            location: trend.location,
            promoted: trend.promoted,
            created_at: trend.created_at,
        }
    }
}

/// One page of a reverse-chronological feed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Pass back to fetch the next page; absent once the feed is exhausted.
    pub next_cursor: Option<String>,
}

/// Cursor for the page after `rows`, or `None` when `rows` did not fill the
/// page and the feed is exhausted.
pub fn next_cursor<R>(rows: &[R], limit: u64, key: impl Fn(&R) -> Cursor) -> Option<String> {
    if rows.len() as u64 >= limit {
        rows.last().map(|last| key(last).encode())
    } else {
        None
    }
}

/// One page of a ranked feed, addressed by page number.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPage<T> {
    pub items: Vec<T>,
    /// Zero-based page number of this page.
    pub page: u64,
    pub has_more: bool,
}

/// Resolves tweet rows into [`TweetView`]s with a fixed number of batched
/// queries per call, independent of page size.
#[derive(Clone)]
pub struct TweetHydrator {
    tweet_repo: TweetRepository,
    like_repo: TweetLikeRepository,
    user_repo: UserRepository,
}

impl TweetHydrator {
    /// Create a new hydrator.
    #[must_use]
    pub const fn new(
        tweet_repo: TweetRepository,
        like_repo: TweetLikeRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            tweet_repo,
            like_repo,
            user_repo,
        }
    }

    /// Hydrate a single tweet.
    pub async fn hydrate_one(&self, tweet: tweet::Model) -> AppResult<Option<TweetView>> {
        Ok(self.hydrate(vec![tweet]).await?.into_iter().next())
    }

    /// Hydrate tweets, preserving input order. Rows whose author no longer
    /// exists are dropped.
    pub async fn hydrate(&self, tweets: Vec<tweet::Model>) -> AppResult<Vec<TweetView>> {
        if tweets.is_empty() {
            return Ok(vec![]);
        }

        let present: HashSet<&str> = tweets.iter().map(|t| t.id.as_str()).collect();
        let original_ids: Vec<String> = tweets
            .iter()
            .filter_map(|t| t.original_tweet_id.clone())
            .filter(|id| !present.contains(id.as_str()))
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let originals = self.tweet_repo.find_by_ids(&original_ids).await?;

        let mut by_id: HashMap<String, tweet::Model> = originals
            .into_iter()
            .map(|t| (t.id.clone(), t))
            .collect();
        for t in &tweets {
            by_id.insert(t.id.clone(), t.clone());
        }

        let all_ids: Vec<String> = by_id.keys().cloned().collect();

        let mut likes: HashMap<String, Vec<String>> = HashMap::new();
        for like in self.like_repo.find_by_tweets(&all_ids).await? {
            likes.entry(like.tweet_id).or_default().push(like.user_id);
        }

        let mut retweeters: HashMap<String, Vec<String>> = HashMap::new();
        for record in self.tweet_repo.find_retweets_of(&all_ids).await? {
            if let Some(original_id) = record.original_tweet_id {
                retweeters.entry(original_id).or_default().push(record.user_id);
            }
        }

        let author_ids: Vec<String> = by_id
            .values()
            .map(|t| t.user_id.clone())
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let authors: HashMap<String, UserSummary> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .iter()
            .map(|u| (u.id.clone(), UserSummary::from(u)))
            .collect();

        let build = |t: &tweet::Model| -> Option<TweetView> {
            let author = authors.get(&t.user_id)?.clone();
            let liked_by = likes.get(&t.id).cloned().unwrap_or_default();
            Some(TweetView {
                id: t.id.clone(),
                author,
                content: t.content.clone(),
                image: t.image.clone(),
                like_count: liked_by.len(),
                likes: liked_by,
                retweeted_by: retweeters.get(&t.id).cloned().unwrap_or_default(),
                retweet_count: t.retweet_count,
                reply_to: t.reply_to_id.clone(),
                is_reply: t.is_reply,
                is_retweet: t.is_retweet,
                original_tweet: None,
                created_at: t.created_at,
            })
        };

        Ok(tweets
            .iter()
            .filter_map(|t| {
                let mut view = build(t)?;
                view.original_tweet = t
                    .original_tweet_id
                    .as_ref()
                    .and_then(|id| by_id.get(id))
                    .and_then(&build)
                    .map(Box::new);
                Some(view)
            })
            .collect())
    }
}

/// Convert notification rows into views, resolving actors in one query.
pub async fn notification_views(
    user_repo: &UserRepository,
    notifications: Vec<notification::Model>,
) -> AppResult<Vec<NotificationView>> {
    let actor_ids: Vec<String> = notifications
        .iter()
        .map(|n| n.actor_id.clone())
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let actors: HashMap<String, UserSummary> = user_repo
        .find_by_ids(&actor_ids)
        .await?
        .iter()
        .map(|u| (u.id.clone(), UserSummary::from(u)))
        .collect();

    Ok(notifications
        .into_iter()
        .filter_map(|n| {
            let actor = actors.get(&n.actor_id)?.clone();
            Some(NotificationView {
                id: n.id,
                notification_type: n.notification_type,
                actor,
                tweet_id: n.tweet_id,
                content: n.content,
                is_read: n.is_read,
                created_at: n.created_at,
            })
        })
        .collect())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chirp_common::clock::from_millis;

    #[test]
    fn test_page_cursor_only_when_full() {
        let key = |n: &i64| Cursor::after(from_millis(*n), &format!("id{n}"));

        assert_eq!(next_cursor(&[30_i64, 20], 2, key).as_deref(), Some("20_id20"));
        assert!(next_cursor(&[30_i64], 2, key).is_none());
    }

    #[test]
    fn test_profile_omits_follow_state_for_anonymous() {
        let user = user::Model {
            id: "u1".to_string(),
            username: "Alice".to_string(),
            username_lower: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "hash".to_string(),
            token: "token".to_string(),
            name: "Alice".to_string(),
            name_lower: "alice".to_string(),
            bio: None,
            location: None,
            website: None,
            profile_image_url: None,
            cover_image_url: None,
            followers_count: 3,
            following_count: 1,
            created_at: from_millis(0),
            updated_at: None,
        };

        let json = serde_json::to_value(UserProfile::from(&user)).unwrap();
        assert_eq!(json["followersCount"], 3);
        assert!(json.get("isFollowing").is_none());
        assert!(json.get("email").is_none());

        let me = serde_json::to_value(MeView::from(&user)).unwrap();
        assert_eq!(me["email"], "alice@example.com");
        assert_eq!(me["username"], "Alice");
    }
}
