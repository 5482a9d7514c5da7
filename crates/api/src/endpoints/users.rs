//! User endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chirp_common::AppResult;
use chirp_core::{Page, TweetView, UserProfile};
use serde::Deserialize;

use crate::{extractors::MaybeAuthUser, middleware::AppState, response::ApiResponse};

/// Number of suggestions when the request does not say.
const DEFAULT_SUGGESTIONS: u64 = 3;

/// Request naming one user.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsernameRequest {
    pub username: String,
}

/// Profile timeline request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTweetsRequest {
    pub username: String,
    pub limit: Option<u64>,
    pub cursor: Option<String>,
}

/// Follower or following list request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationListRequest {
    pub username: String,
    pub limit: Option<u64>,
    #[serde(default)]
    pub offset: u64,
}

/// Suggestions request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsRequest {
    pub limit: Option<u64>,
}

/// Public profile.
async fn show(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<UsernameRequest>,
) -> AppResult<ApiResponse<UserProfile>> {
    let profile = state
        .user_service
        .profile(&req.username, viewer.id())
        .await?;
    Ok(ApiResponse::ok(profile))
}

/// Tweets by a user.
async fn tweets(
    State(state): State<AppState>,
    Json(req): Json<UserTweetsRequest>,
) -> AppResult<ApiResponse<Page<TweetView>>> {
    let page = state
        .timeline_service
        .profile(&req.username, req.limit, req.cursor.as_deref())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// Users following a user.
async fn followers(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<RelationListRequest>,
) -> AppResult<ApiResponse<Vec<UserProfile>>> {
    let limit = state.timeline.clamp(req.limit);
    let users = state
        .following_service
        .followers(&req.username, viewer.id(), limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(users))
}

/// Users a user follows.
async fn following(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<RelationListRequest>,
) -> AppResult<ApiResponse<Vec<UserProfile>>> {
    let limit = state.timeline.clamp(req.limit);
    let users = state
        .following_service
        .following(&req.username, viewer.id(), limit, req.offset)
        .await?;
    Ok(ApiResponse::ok(users))
}

/// Who to follow.
async fn suggestions(
    viewer: MaybeAuthUser,
    State(state): State<AppState>,
    Json(req): Json<SuggestionsRequest>,
) -> AppResult<ApiResponse<Vec<UserProfile>>> {
    let limit = state
        .timeline
        .clamp(Some(req.limit.unwrap_or(DEFAULT_SUGGESTIONS)));
    let users = state.user_service.suggestions(viewer.id(), limit).await?;
    Ok(ApiResponse::ok(users))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/show", post(show))
        .route("/tweets", post(tweets))
        .route("/followers", post(followers))
        .route("/following", post(following))
        .route("/suggestions", post(suggestions))
}
