//! Timeline service.
//!
//! Read-only feeds over tweets. Chronological feeds page by a
//! `(created_at, id)` cursor; explore pages by offset over a total order.

use chirp_common::{AppResult, TimelineConfig};
use chirp_db::{
    Cursor,
    entities::tweet,
    repositories::{FollowingRepository, TweetRepository, UserRepository},
};

use crate::views::{Page, RankedPage, TweetHydrator, TweetView, next_cursor};

/// Timeline service for business logic.
#[derive(Clone)]
pub struct TimelineService {
    tweet_repo: TweetRepository,
    following_repo: FollowingRepository,
    user_repo: UserRepository,
    hydrator: TweetHydrator,
    config: TimelineConfig,
}

impl TimelineService {
    /// Create a new timeline service.
    #[must_use]
    pub const fn new(
        tweet_repo: TweetRepository,
        following_repo: FollowingRepository,
        user_repo: UserRepository,
        hydrator: TweetHydrator,
        config: TimelineConfig,
    ) -> Self {
        Self {
            tweet_repo,
            following_repo,
            user_repo,
            hydrator,
            config,
        }
    }

    /// Tweets by the user and everyone they follow, newest first.
    ///
    /// The follow set is read on every call, so follows and unfollows show
    /// up on the next page fetched.
    pub async fn home(
        &self,
        user_id: &str,
        limit: Option<u64>,
        cursor: Option<&str>,
    ) -> AppResult<Page<TweetView>> {
        let limit = self.config.clamp(limit);
        let cursor = Cursor::parse_opt(cursor)?;

        let mut authors = self.following_repo.find_followee_ids(user_id).await?;
        authors.push(user_id.to_string());

        let rows = self
            .tweet_repo
            .find_by_users(&authors, limit, cursor.as_ref())
            .await?;
        self.page(rows, limit).await
    }

    /// Tweets authored by `username`, newest first.
    pub async fn profile(
        &self,
        username: &str,
        limit: Option<u64>,
        cursor: Option<&str>,
    ) -> AppResult<Page<TweetView>> {
        let limit = self.config.clamp(limit);
        let cursor = Cursor::parse_opt(cursor)?;
        let user = self.user_repo.get_by_username(username).await?;

        let rows = self
            .tweet_repo
            .find_by_user(&user.id, limit, cursor.as_ref())
            .await?;
        self.page(rows, limit).await
    }

    /// All tweets, or only the replies to `reply_to`, newest first.
    pub async fn list(
        &self,
        reply_to: Option<&str>,
        limit: Option<u64>,
        cursor: Option<&str>,
    ) -> AppResult<Page<TweetView>> {
        let limit = self.config.clamp(limit);
        let cursor = Cursor::parse_opt(cursor)?;

        let rows = self
            .tweet_repo
            .find_all(reply_to, limit, cursor.as_ref())
            .await?;
        self.page(rows, limit).await
    }

    /// All tweets ranked by retweets, likes, recency and ID.
    ///
    /// Pages count from 1; a missing or zero page is the first.
    pub async fn explore(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> AppResult<RankedPage<TweetView>> {
        let limit = self.config.clamp(limit);
        let page = page.unwrap_or(1).max(1);

        // One extra row tells whether another page exists.
        let mut rows = self
            .tweet_repo
            .find_explore(limit + 1, (page - 1).saturating_mul(limit))
            .await?;
        let has_more = rows.len() as u64 > limit;
        rows.truncate(limit as usize);

        Ok(RankedPage {
            items: self.hydrator.hydrate(rows).await?,
            page,
            has_more,
        })
    }

    /// The cursor comes from the raw rows so a row dropped during hydration
    /// does not end the feed early.
    async fn page(&self, rows: Vec<tweet::Model>, limit: u64) -> AppResult<Page<TweetView>> {
        let next_cursor = next_cursor(&rows, limit, |t| Cursor::after(t.created_at, &t.id));

        Ok(Page {
            items: self.hydrator.hydrate(rows).await?,
            next_cursor,
        })
    }
}
