//! Search service.
//!
//! Case-insensitive substring search over tweet bodies and user handles or
//! display names. Mixed searches return a fixed number of each kind rather
//! than a single relevance ranking.

use chirp_common::{AppError, AppResult, TimelineConfig};
use chirp_db::repositories::{TweetRepository, UserRepository};
use serde::{Deserialize, Serialize};

use crate::views::{TweetHydrator, TweetView, UserProfile};

/// Users returned by a mixed search.
const MIXED_USER_LIMIT: u64 = 5;
/// Tweets returned by a mixed search.
const MIXED_TWEET_LIMIT: u64 = 10;

/// What to search for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    #[default]
    All,
    Users,
    Tweets,
}

/// A search result, tagged with its kind.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SearchHit {
    User(UserProfile),
    Tweet(TweetView),
}

/// Search service for business logic.
#[derive(Clone)]
pub struct SearchService {
    user_repo: UserRepository,
    tweet_repo: TweetRepository,
    hydrator: TweetHydrator,
    config: TimelineConfig,
}

impl SearchService {
    /// Create a new search service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        tweet_repo: TweetRepository,
        hydrator: TweetHydrator,
        config: TimelineConfig,
    ) -> Self {
        Self {
            user_repo,
            tweet_repo,
            hydrator,
            config,
        }
    }

    /// Run a search. Users come before tweets in mixed results.
    pub async fn search(
        &self,
        query: &str,
        kind: SearchKind,
        limit: Option<u64>,
    ) -> AppResult<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(AppError::Validation("Search query is required".to_string()));
        }

        let (user_limit, tweet_limit) = match kind {
            SearchKind::All => (MIXED_USER_LIMIT, MIXED_TWEET_LIMIT),
            SearchKind::Users => (self.config.clamp(limit), 0),
            SearchKind::Tweets => (0, self.config.clamp(limit)),
        };

        let mut hits = Vec::new();

        if user_limit > 0 {
            let users = self.user_repo.search(query, user_limit).await?;
            hits.extend(
                users
                    .iter()
                    .map(|u| SearchHit::User(UserProfile::from(u))),
            );
        }

        if tweet_limit > 0 {
            let tweets = self.tweet_repo.search(query, tweet_limit).await?;
            hits.extend(
                self.hydrator
                    .hydrate(tweets)
                    .await?
                    .into_iter()
                    .map(SearchHit::Tweet),
            );
        }

        tracing::debug!(query, ?kind, hits = hits.len(), "Search");

        Ok(hits)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_parses_lowercase() {
        let kind: SearchKind = serde_json::from_str("\"users\"").unwrap();
        assert_eq!(kind, SearchKind::Users);
        assert!(serde_json::from_str::<SearchKind>("\"people\"").is_err());
    }
}
