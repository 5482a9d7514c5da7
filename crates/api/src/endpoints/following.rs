//! Following endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chirp_common::AppResult;
use chirp_core::UserProfile;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Follow request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowRequest {
    pub user_id: String,
}

/// Follow a user. Responds with the followee's updated profile.
async fn follow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<UserProfile>> {
    state.following_service.follow(&user.id, &req.user_id).await?;
    followee_profile(&state, &user.id, &req.user_id).await
}

/// Unfollow a user. Responds with the followee's updated profile.
async fn unfollow(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(req): Json<FollowRequest>,
) -> AppResult<ApiResponse<UserProfile>> {
    state
        .following_service
        .unfollow(&user.id, &req.user_id)
        .await?;
    followee_profile(&state, &user.id, &req.user_id).await
}

async fn followee_profile(
    state: &AppState,
    viewer_id: &str,
    followee_id: &str,
) -> AppResult<ApiResponse<UserProfile>> {
    let followee = state.user_service.get(followee_id).await?;
    let profile = state
        .user_service
        .profile(&followee.username, Some(viewer_id))
        .await?;
    Ok(ApiResponse::ok(profile))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(follow))
        .route("/delete", post(unfollow))
}
