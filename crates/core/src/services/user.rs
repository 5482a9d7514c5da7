//! User service.

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chirp_common::{AppError, AppResult, ConflictKind, IdGenerator, Metrics, SharedClock, get_metrics};
use chirp_db::{
    entities::user,
    repositories::{FollowingRepository, UserRepository},
};
use regex::Regex;
use sea_orm::Set;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::views::UserProfile;

#[allow(clippy::expect_used)]
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("valid username regex"));

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    following_repo: FollowingRepository,
    id_gen: IdGenerator,
    clock: SharedClock,
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 50))]
    pub name: String,

    #[validate(length(min = 3, max = 15), custom(function = "validate_username"))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    pub confirm_password: String,
}

/// Input for signing in.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginInput {
    #[validate(email)]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,
}

/// Input for updating profile fields. Absent fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,

    #[validate(length(max = 160))]
    pub bio: Option<String>,

    #[validate(length(max = 30))]
    pub location: Option<String>,

    #[validate(length(max = 100))]
    pub website: Option<String>,

    #[validate(length(max = 1024))]
    pub profile_image_url: Option<String>,

    #[validate(length(max = 1024))]
    pub cover_image_url: Option<String>,
}

/// Input for changing a password.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordInput {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,
}

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(ValidationError::new("username_charset")
            .with_message("Username can only contain letters, numbers and underscores".into()))
    }
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        following_repo: FollowingRepository,
        clock: SharedClock,
    ) -> Self {
        Self {
            user_repo,
            following_repo,
            id_gen: IdGenerator::new(),
            clock,
        }
    }

    /// Register a new account and issue its first access token.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if input.password != input.confirm_password {
            return Err(AppError::Validation("Passwords do not match".to_string()));
        }

        if self.user_repo.find_by_username(&input.username).await?.is_some() {
            return Err(AppError::Conflict(ConflictKind::UsernameTaken));
        }
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::Conflict(ConflictKind::EmailTaken));
        }

        let password_hash = hash_password(&input.password)?;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username: Set(input.username.clone()),
            username_lower: Set(input.username.to_lowercase()),
            email: Set(input.email.to_lowercase()),
            password: Set(password_hash),
            token: Set(self.id_gen.generate_token()),
            name: Set(input.name.trim().to_string()),
            name_lower: Set(input.name.trim().to_lowercase()),
            followers_count: Set(0),
            following_count: Set(0),
            created_at: Set(self.clock.now()),
            ..Default::default()
        };

        let user = self.user_repo.create(model).await?;
        Metrics::incr(&get_metrics().users_registered);
        tracing::info!(user_id = %user.id, username = %user.username, "Registered user");

        Ok(user)
    }

    /// Check credentials and return the account, whose `token` is the
    /// session credential.
    pub async fn login(&self, input: LoginInput) -> AppResult<user::Model> {
        input.validate()?;

        let user = self
            .user_repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(&input.password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Replace a user's token, invalidating the old one.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let new_token = self.id_gen.generate_token();

        let mut active: user::ActiveModel = user.into();
        active.token = Set(new_token.clone());
        active.updated_at = Set(Some(self.clock.now()));

        self.user_repo.update(active).await?;

        Ok(new_token)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Get a user by handle.
    pub async fn get_by_username(&self, username: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_username(username).await
    }

    /// Public profile of `username`, with follow state relative to the viewer.
    pub async fn profile(&self, username: &str, viewer_id: Option<&str>) -> AppResult<UserProfile> {
        let user = self.user_repo.get_by_username(username).await?;
        let mut profile = UserProfile::from(&user);

        if let Some(viewer_id) = viewer_id {
            profile.is_following = Some(
                self.following_repo
                    .is_following(viewer_id, &user.id)
                    .await?,
            );
        }

        Ok(profile)
    }

    /// Update profile fields.
    pub async fn update_profile(
        &self,
        id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(id).await?;
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name_lower = Set(name.trim().to_lowercase());
            active.name = Set(name.trim().to_string());
        }
        if let Some(bio) = input.bio {
            active.bio = Set(non_empty(bio));
        }
        if let Some(location) = input.location {
            active.location = Set(non_empty(location));
        }
        if let Some(website) = input.website {
            active.website = Set(non_empty(website));
        }
        if let Some(url) = input.profile_image_url {
            active.profile_image_url = Set(non_empty(url));
        }
        if let Some(url) = input.cover_image_url {
            active.cover_image_url = Set(non_empty(url));
        }

        active.updated_at = Set(Some(self.clock.now()));

        self.user_repo.update(active).await
    }

    /// Change the password after checking the current one. Rotates the token.
    pub async fn update_password(
        &self,
        id: &str,
        input: UpdatePasswordInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(id).await?;
        if !verify_password(&input.current_password, &user.password)? {
            return Err(AppError::Unauthorized);
        }

        let mut active: user::ActiveModel = user.into();
        active.password = Set(hash_password(&input.new_password)?);
        active.token = Set(self.id_gen.generate_token());
        active.updated_at = Set(Some(self.clock.now()));

        self.user_repo.update(active).await
    }

    /// Users the viewer might want to follow.
    pub async fn suggestions(
        &self,
        viewer_id: Option<&str>,
        limit: u64,
    ) -> AppResult<Vec<UserProfile>> {
        let users = self.user_repo.find_suggestions(viewer_id, limit).await?;
        Ok(users
            .iter()
            .map(|u| {
                let mut profile = UserProfile::from(u);
                profile.is_following = viewer_id.map(|_| false);
                profile
            })
            .collect())
    }
}

fn non_empty(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
