//! Trend service.
//!
//! Trending topics are an externally seeded read model. Nothing derives them
//! from tweets; the counts change only through [`TrendService::upsert`].

use chirp_common::{AppError, AppResult, IdGenerator, SharedClock, TrendsConfig};
use chirp_db::{entities::trend, repositories::TrendRepository};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

use crate::views::TrendView;

/// Upper bound on a single trends request.
const MAX_TRENDS: u64 = 50;

/// Topics inserted into an empty trend table.
const SAMPLE_TRENDS: &[(&str, i64, &str, bool)] = &[
    ("#JavaScript", 12_500, "Worldwide", false),
    ("#ReactJS", 8_300, "United States", false),
    ("#WebDevelopment", 5_200, "Worldwide", false),
    ("#NextJS", 4_100, "United Kingdom", false),
    ("#TailwindCSS", 3_700, "Worldwide", false),
    ("#MongoDB", 2_900, "India", false),
    ("#NodeJS", 2_600, "Worldwide", false),
    ("#ExpressJS", 1_800, "Canada", false),
    ("#FullStack", 1_500, "Worldwide", false),
    ("#ChirpSocial", 1_200, "Worldwide", true),
];

/// Input for creating or updating a trend.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpsertTrendInput {
    #[validate(length(min = 1, max = 100))]
    pub topic: String,

    #[validate(range(min = 0))]
    pub tweet_count: i64,

    #[validate(length(max = 100))]
    #[serde(default = "default_location")]
    pub location: String,

    #[serde(default)]
    pub promoted: bool,
}

fn default_location() -> String {
    "Worldwide".to_string()
}

/// Trend service for business logic.
#[derive(Clone)]
pub struct TrendService {
    trend_repo: TrendRepository,
    config: TrendsConfig,
    id_gen: IdGenerator,
    clock: SharedClock,
}

impl TrendService {
    /// Create a new trend service.
    #[must_use]
    pub const fn new(trend_repo: TrendRepository, config: TrendsConfig, clock: SharedClock) -> Self {
        Self {
            trend_repo,
            config,
            id_gen: IdGenerator::new(),
            clock,
        }
    }

    /// Top trends by tweet count.
    pub async fn list(&self, limit: Option<u64>) -> AppResult<Vec<TrendView>> {
        let limit = limit.unwrap_or(self.config.default_limit).clamp(1, MAX_TRENDS);
        let trends = self.trend_repo.find_top(limit).await?;
        Ok(trends.into_iter().map(TrendView::from).collect())
    }

    /// Insert a topic, or overwrite the counts of an existing one.
    pub async fn upsert(&self, input: UpsertTrendInput) -> AppResult<TrendView> {
        input.validate()?;

        let topic = input.topic.trim().to_string();
        if topic.is_empty() {
            return Err(AppError::Validation("Trend topic is required".to_string()));
        }

        let saved = match self.trend_repo.find_by_topic(&topic).await? {
            Some(existing) => {
                self.trend_repo
                    .update_counts(existing, input.tweet_count, input.location, input.promoted)
                    .await?
            }
            None => {
                self.trend_repo
                    .create(trend::ActiveModel {
                        id: Set(self.id_gen.generate()),
                        topic: Set(topic),
                        tweet_count: Set(input.tweet_count),
                        location: Set(input.location),
                        promoted: Set(input.promoted),
                        created_at: Set(self.clock.now()),
                    })
                    .await?
            }
        };

        Ok(saved.into())
    }

    /// Insert the sample topics if no trends exist yet. Returns how many were
    /// inserted.
    pub async fn seed_defaults(&self) -> AppResult<usize> {
        if !self.config.seed_defaults || self.trend_repo.count().await? > 0 {
            return Ok(0);
        }

        for (topic, tweet_count, location, promoted) in SAMPLE_TRENDS {
            self.upsert(UpsertTrendInput {
                topic: (*topic).to_string(),
                tweet_count: *tweet_count,
                location: (*location).to_string(),
                promoted: *promoted,
            })
            .await?;
        }

        tracing::info!(count = SAMPLE_TRENDS.len(), "Seeded sample trends");

        Ok(SAMPLE_TRENDS.len())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chirp_common::ManualClock;
    use chirp_db::test_utils::TestDatabase;
    use std::sync::Arc;

    async fn service(config: TrendsConfig) -> TrendService {
        let db = TestDatabase::in_memory().await.unwrap().connection();
        TrendService::new(TrendRepository::new(db), config, Arc::new(ManualClock::default()))
    }

    #[tokio::test]
    async fn test_seed_once_and_order_by_count() {
        let service = service(TrendsConfig::default()).await;

        assert_eq!(service.seed_defaults().await.unwrap(), SAMPLE_TRENDS.len());
        assert_eq!(service.seed_defaults().await.unwrap(), 0);

        let top = service.list(None).await.unwrap();
        let topics: Vec<&str> = top.iter().map(|t| t.topic.as_str()).collect();
        assert_eq!(
            topics,
            ["#JavaScript", "#ReactJS", "#WebDevelopment", "#NextJS", "#TailwindCSS"]
        );
    }

    #[tokio::test]
    async fn test_upsert_reorders() {
        let service = service(TrendsConfig::default()).await;
        service.seed_defaults().await.unwrap();

        service
            .upsert(UpsertTrendInput {
                topic: "#ChirpSocial".to_string(),
                tweet_count: 20_000,
                location: "Worldwide".to_string(),
                promoted: true,
            })
            .await
            .unwrap();

        let top = service.list(Some(1)).await.unwrap();
        assert_eq!(top[0].topic, "#ChirpSocial");
        assert_eq!(top[0].tweet_count, 20_000);
    }

    #[tokio::test]
    async fn test_seeding_disabled() {
        let service = service(TrendsConfig {
            seed_defaults: false,
            default_limit: 5,
        })
        .await;

        assert_eq!(service.seed_defaults().await.unwrap(), 0);
        assert!(service.list(None).await.unwrap().is_empty());
    }
}
