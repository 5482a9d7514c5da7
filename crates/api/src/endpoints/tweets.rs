//! Tweet endpoints: posting, reading, engagement and the home timeline.

use axum::{Json, Router, extract::State, routing::post};
use chirp_common::AppResult;
use chirp_core::{CreateTweetInput, Page, TweetDetail, TweetView};
use serde::Deserialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Done},
};

/// Request naming one tweet.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetIdRequest {
    pub tweet_id: String,
}

/// Reply request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplyRequest {
    pub tweet_id: String,
    #[serde(flatten)]
    pub tweet: CreateTweetInput,
}

/// Show request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowRequest {
    pub tweet_id: String,
    pub replies_limit: Option<u64>,
}

/// Cursor-paged feed request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedRequest {
    pub limit: Option<u64>,
    pub cursor: Option<String>,
}

/// List request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    pub reply_to: Option<String>,
    #[serde(flatten)]
    pub feed: FeedRequest,
}

/// Post a tweet.
async fn create(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateTweetInput>,
) -> AppResult<ApiResponse<TweetView>> {
    let tweet = state.tweet_service.post(&user.id, input).await?;
    Ok(ApiResponse::ok(tweet))
}

/// Reply to a tweet.
async fn reply(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<ReplyRequest>,
) -> AppResult<ApiResponse<TweetView>> {
    let tweet = state
        .tweet_service
        .reply(&user.id, &req.tweet_id, req.tweet)
        .await?;
    Ok(ApiResponse::ok(tweet))
}

/// A tweet with its replies.
async fn show(
    State(state): State<AppState>,
    Json(req): Json<ShowRequest>,
) -> AppResult<ApiResponse<TweetDetail>> {
    let limit = state.timeline.clamp(req.replies_limit);
    let detail = state.tweet_service.show(&req.tweet_id, limit).await?;
    Ok(ApiResponse::ok(detail))
}

/// All tweets, or replies to one tweet.
async fn list(
    State(state): State<AppState>,
    Json(req): Json<ListRequest>,
) -> AppResult<ApiResponse<Page<TweetView>>> {
    let page = state
        .timeline_service
        .list(req.reply_to.as_deref(), req.feed.limit, req.feed.cursor.as_deref())
        .await?;
    Ok(ApiResponse::ok(page))
}

/// Delete own tweet.
async fn delete(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TweetIdRequest>,
) -> AppResult<ApiResponse<Done>> {
    state.tweet_service.delete(&user.id, &req.tweet_id).await?;
    Ok(ApiResponse::ok(Done::YES))
}

/// Like a tweet.
async fn like(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TweetIdRequest>,
) -> AppResult<ApiResponse<TweetView>> {
    let tweet = state.like_service.like(&user.id, &req.tweet_id).await?;
    Ok(ApiResponse::ok(tweet))
}

/// Remove a like.
async fn unlike(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TweetIdRequest>,
) -> AppResult<ApiResponse<TweetView>> {
    let tweet = state.like_service.unlike(&user.id, &req.tweet_id).await?;
    Ok(ApiResponse::ok(tweet))
}

/// Retweet a tweet.
async fn retweet(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TweetIdRequest>,
) -> AppResult<ApiResponse<TweetView>> {
    let record = state.retweet_service.retweet(&user.id, &req.tweet_id).await?;
    Ok(ApiResponse::ok(record))
}

/// Undo a retweet.
async fn unretweet(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<TweetIdRequest>,
) -> AppResult<ApiResponse<TweetView>> {
    let original = state
        .retweet_service
        .unretweet(&user.id, &req.tweet_id)
        .await?;
    Ok(ApiResponse::ok(original))
}

/// Home timeline.
async fn timeline(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FeedRequest>,
) -> AppResult<ApiResponse<Page<TweetView>>> {
    let page = state
        .timeline_service
        .home(&user.id, req.limit, req.cursor.as_deref())
        .await?;
    Ok(ApiResponse::ok(page))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/reply", post(reply))
        .route("/show", post(show))
        .route("/list", post(list))
        .route("/delete", post(delete))
        .route("/like", post(like))
        .route("/unlike", post(unlike))
        .route("/retweet", post(retweet))
        .route("/unretweet", post(unretweet))
        .route("/timeline", post(timeline))
}
