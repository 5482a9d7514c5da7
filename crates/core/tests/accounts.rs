//! Registration, sign-in and profile management.

#![allow(clippy::unwrap_used)]

mod common;

use chirp_common::{AppError, ConflictKind};
use chirp_core::{LoginInput, RegisterInput, UpdatePasswordInput, UpdateProfileInput};
use common::Harness;

fn register(username: &str, email: &str) -> RegisterInput {
    RegisterInput {
        name: "Test User".to_string(),
        username: username.to_string(),
        email: email.to_string(),
        password: "password123".to_string(),
        confirm_password: "password123".to_string(),
    }
}

#[tokio::test]
async fn register_login_and_token_lifecycle() {
    let h = Harness::new().await;

    let user = h
        .users
        .register(register("Alice_1", "Alice@Example.com"))
        .await
        .unwrap();
    assert_eq!(user.username, "Alice_1");
    assert_eq!(user.email, "alice@example.com");
    assert_ne!(user.password, "password123");

    let found = h.users.authenticate_by_token(&user.token).await.unwrap();
    assert_eq!(found.id, user.id);

    let logged_in = h
        .users
        .login(LoginInput {
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(logged_in.id, user.id);

    let err = h
        .users
        .login(LoginInput {
            email: "alice@example.com".to_string(),
            password: "wrong-password".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let new_token = h.users.regenerate_token(&user.id).await.unwrap();
    assert_ne!(new_token, user.token);
    assert!(h.users.authenticate_by_token(&user.token).await.is_err());
    assert!(h.users.authenticate_by_token(&new_token).await.is_ok());
}

#[tokio::test]
async fn duplicate_handles_and_emails_conflict() {
    let h = Harness::new().await;
    h.users
        .register(register("alice", "alice@example.com"))
        .await
        .unwrap();

    let err = h
        .users
        .register(register("ALICE", "other@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.conflict_kind(), Some(ConflictKind::UsernameTaken));

    let err = h
        .users
        .register(register("alice2", "ALICE@example.com"))
        .await
        .unwrap_err();
    assert_eq!(err.conflict_kind(), Some(ConflictKind::EmailTaken));
}

#[tokio::test]
async fn mismatched_passwords_are_rejected() {
    let h = Harness::new().await;
    let mut input = register("alice", "alice@example.com");
    input.confirm_password = "different1".to_string();

    let err = h.users.register(input).await.unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn profile_update_and_follow_state() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;

    let updated = h
        .users
        .update_profile(
            &bob.id,
            UpdateProfileInput {
                bio: Some("Rustacean".to_string()),
                location: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.bio.as_deref(), Some("Rustacean"));
    assert!(updated.location.is_none());
    assert_eq!(updated.name, bob.name);

    let anonymous = h.users.profile("bob", None).await.unwrap();
    assert!(anonymous.is_following.is_none());

    h.following.follow(&alice.id, &bob.id).await.unwrap();
    let viewed = h.users.profile("BOB", Some(&alice.id)).await.unwrap();
    assert_eq!(viewed.is_following, Some(true));
    assert_eq!(viewed.followers_count, 1);

    let err = h.users.profile("nobody", None).await.unwrap_err();
    assert!(matches!(err, AppError::UserNotFound(_)));
}

#[tokio::test]
async fn password_change_rotates_token() {
    let h = Harness::new().await;
    let user = h
        .users
        .register(register("alice", "alice@example.com"))
        .await
        .unwrap();

    let err = h
        .users
        .update_password(
            &user.id,
            UpdatePasswordInput {
                current_password: "nope-nope".to_string(),
                new_password: "newpassword1".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));

    let changed = h
        .users
        .update_password(
            &user.id,
            UpdatePasswordInput {
                current_password: "password123".to_string(),
                new_password: "newpassword1".to_string(),
            },
        )
        .await
        .unwrap();
    assert_ne!(changed.token, user.token);

    h.users
        .login(LoginInput {
            email: "alice@example.com".to_string(),
            password: "newpassword1".to_string(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn suggestions_skip_self_and_followed() {
    let h = Harness::new().await;
    let alice = h.user("alice").await;
    let bob = h.user("bob").await;
    let carol = h.user("carol").await;
    let dave = h.user("dave").await;

    h.following.follow(&alice.id, &bob.id).await.unwrap();
    h.following.follow(&carol.id, &dave.id).await.unwrap();

    let suggestions = h.users.suggestions(Some(&alice.id), 3).await.unwrap();
    let names: Vec<&str> = suggestions.iter().map(|u| u.username.as_str()).collect();
    assert_eq!(names, ["dave", "carol"]);
}
