//! Explore, search and trends.

use axum::{Json, Router, extract::State, routing::post};
use chirp_common::AppResult;
use chirp_core::{RankedPage, SearchHit, SearchKind, TrendView, TweetView};
use serde::Deserialize;

use crate::{middleware::AppState, response::ApiResponse};

/// Explore request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExploreRequest {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Search request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    #[serde(default, rename = "type")]
    pub kind: SearchKind,
    pub limit: Option<u64>,
}

/// Trends request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendsRequest {
    pub limit: Option<u64>,
}

/// Popular tweets.
async fn explore(
    State(state): State<AppState>,
    Json(req): Json<ExploreRequest>,
) -> AppResult<ApiResponse<RankedPage<TweetView>>> {
    let page = state.timeline_service.explore(req.page, req.limit).await?;
    Ok(ApiResponse::ok(page))
}

/// Search users and tweets.
async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> AppResult<ApiResponse<Vec<SearchHit>>> {
    let hits = state
        .search_service
        .search(&req.query, req.kind, req.limit)
        .await?;
    Ok(ApiResponse::ok(hits))
}

/// Trending topics.
async fn trends(
    State(state): State<AppState>,
    Json(req): Json<TrendsRequest>,
) -> AppResult<ApiResponse<Vec<TrendView>>> {
    let trends = state.trend_service.list(req.limit).await?;
    Ok(ApiResponse::ok(trends))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/explore", post(explore))
        .route("/search", post(search))
        .route("/trends", post(trends))
}
