//! Authentication and own-account endpoints.

use axum::{Json, Router, extract::State, routing::post};
use chirp_common::AppResult;
use chirp_core::{LoginInput, MeView, RegisterInput, UpdatePasswordInput, UpdateProfileInput};
use chirp_db::entities::user;
use serde::Serialize;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ApiResponse, Done},
};

/// Session response: the account and its bearer token.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: MeView,
    pub token: String,
}

impl From<user::Model> for SessionResponse {
    fn from(user: user::Model) -> Self {
        Self {
            user: MeView::from(&user),
            token: user.token,
        }
    }
}

/// Token response.
#[derive(Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Create a new account.
async fn signup(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let user = state.user_service.register(input).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Sign in with email and password.
async fn signin(
    State(state): State<AppState>,
    Json(input): Json<LoginInput>,
) -> AppResult<ApiResponse<SessionResponse>> {
    let user = state.user_service.login(input).await?;
    Ok(ApiResponse::ok(user.into()))
}

/// Sign out by rotating the token.
async fn signout(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<Done>> {
    state.user_service.regenerate_token(&user.id).await?;
    Ok(ApiResponse::ok(Done::YES))
}

/// The signed-in account.
async fn me(AuthUser(user): AuthUser) -> ApiResponse<MeView> {
    ApiResponse::ok(MeView::from(&user))
}

/// Update own profile.
async fn update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<MeView>> {
    let updated = state.user_service.update_profile(&user.id, input).await?;
    Ok(ApiResponse::ok(MeView::from(&updated)))
}

/// Change password. The response carries the new token.
async fn update_password(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdatePasswordInput>,
) -> AppResult<ApiResponse<TokenResponse>> {
    let updated = state.user_service.update_password(&user.id, input).await?;
    Ok(ApiResponse::ok(TokenResponse {
        token: updated.token,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/signin", post(signin))
        .route("/signout", post(signout))
        .route("/i", post(me))
        .route("/i/update", post(update))
        .route("/i/update-password", post(update_password))
}
