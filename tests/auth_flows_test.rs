#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait};
use serde_json::json;

use common::{
    PASSWORD, UserSeed, error_of, get, post_json, seed_oauth_user, seed_user, success_of,
};
use streamflix_api::auth::oauth::{OAuthProfile, Provider};
use streamflix_api::entities::{account, password_reset_token, user, verification_token};
use streamflix_api::mail::EmailKind;
use streamflix_api::services::oauth::sign_in_with_oauth;

// ──────────────────────────────────────────────────────────────────────────────
// Registration + verification
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_verify_then_login() {
    let app = common::spawn_app().await;

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/register",
        None,
        &json!({ "email": "Ada@Example.com", "password": PASSWORD, "name": "Ada" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{resp}");
    assert_eq!(success_of(&resp), "Confirmation email sent!");

    let login = json!({ "email": "ada@example.com", "password": PASSWORD });
    let (_, resp) = post_json(&app, "/api/v1/auth/login", None, &login).await;
    assert_eq!(success_of(&resp), "Confirmation email sent!");

    let token = app.mailer.last_secret(EmailKind::Verification).unwrap();
    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/new-verification",
        None,
        &json!({ "token": token }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(success_of(&resp), "Email verified!");

    let remaining = verification_token::Entity::find()
        .count(&app.state.db)
        .await
        .unwrap();
    assert_eq!(remaining, 0);

    let (status, resp) = post_json(&app, "/api/v1/auth/login", None, &login).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(success_of(&resp), "Logged in!");
    assert!(resp["user"]["emailVerified"].is_string());
}

#[tokio::test]
async fn register_rejects_bad_input_and_duplicates() {
    let app = common::spawn_app().await;
    seed_user(&app, UserSeed::verified("ada@example.com")).await;

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/register",
        None,
        &json!({ "email": "x@example.com", "password": "123", "name": "X" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&resp), "Invalid fields!");

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/register",
        None,
        &json!({ "email": "ada@example.com", "password": PASSWORD, "name": "Ada" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_of(&resp), "Email already in use!");
    assert_eq!(app.mailer.count(), 0);
}

#[tokio::test]
async fn verification_rejects_unknown_and_expired_tokens() {
    let app = common::spawn_app().await;
    seed_user(
        &app,
        UserSeed {
            verified: false,
            ..UserSeed::verified("ada@example.com")
        },
    )
    .await;

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/new-verification",
        None,
        &json!({ "token": "does-not-exist" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&resp), "Token does not exist!");

    post_json(
        &app,
        "/api/v1/auth/login",
        None,
        &json!({ "email": "ada@example.com", "password": PASSWORD }),
    )
    .await;
    let stored = verification_token::Entity::find()
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    let value = stored.token.clone();
    let mut expired: verification_token::ActiveModel = stored.into();
    expired.expires = Set((Utc::now() - Duration::hours(2)).fixed_offset());
    expired.update(&app.state.db).await.unwrap();

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/new-verification",
        None,
        &json!({ "token": value }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&resp), "Token has expired!");
}

// ──────────────────────────────────────────────────────────────────────────────
// Password reset
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn reset_then_new_password() {
    let app = common::spawn_app().await;
    seed_user(&app, UserSeed::verified("ada@example.com")).await;

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/reset",
        None,
        &json!({ "email": "ada@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(success_of(&resp), "Reset email sent!");

    let token = app.mailer.last_secret(EmailKind::PasswordReset).unwrap();
    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/new-password",
        None,
        &json!({ "token": token, "password": "brand-new" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(success_of(&resp), "Password updated!");

    let left = password_reset_token::Entity::find()
        .count(&app.state.db)
        .await
        .unwrap();
    assert_eq!(left, 0);

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/login",
        None,
        &json!({ "email": "ada@example.com", "password": "brand-new" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The token is single-use.
    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/new-password",
        None,
        &json!({ "token": token, "password": "another-one" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&resp), "Invalid token!");
}

#[tokio::test]
async fn reset_errors() {
    let app = common::spawn_app().await;

    let (status, resp) =
        post_json(&app, "/api/v1/auth/reset", None, &json!({ "email": "nope" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&resp), "Invalid email!");

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/reset",
        None,
        &json!({ "email": "ghost@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_of(&resp), "Email not found!");

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/new-password",
        None,
        &json!({ "password": "brand-new" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&resp), "Missing token!");

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/new-password",
        None,
        &json!({ "token": "abc", "password": "123" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&resp), "Invalid fields!");
}

// ──────────────────────────────────────────────────────────────────────────────
// Sessions
// ──────────────────────────────────────────────────────────────────────────────

async fn login(app: &common::TestApp) -> (String, String) {
    let (status, resp) = post_json(
        app,
        "/api/v1/auth/login",
        None,
        &json!({ "email": "ada@example.com", "password": PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{resp}");
    (
        resp["token"].as_str().unwrap().to_string(),
        resp["refreshToken"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn refresh_rotates_the_refresh_token() {
    let app = common::spawn_app().await;
    seed_user(&app, UserSeed::verified("ada@example.com")).await;
    let (_, refresh) = login(&app).await;

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/refresh",
        None,
        &json!({ "refreshToken": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let new_access = resp["token"].as_str().unwrap();
    let (status, _) = get(&app, "/api/v1/users/me", Some(new_access)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, resp) = post_json(
        &app,
        "/api/v1/auth/refresh",
        None,
        &json!({ "refreshToken": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&resp), "Unauthorized!");
}

#[tokio::test]
async fn signout_revokes_the_refresh_token() {
    let app = common::spawn_app().await;
    seed_user(&app, UserSeed::verified("ada@example.com")).await;
    let (access, refresh) = login(&app).await;

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/signout",
        Some(&access),
        &json!({ "refreshToken": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = post_json(
        &app,
        "/api/v1/auth/refresh",
        None,
        &json!({ "refreshToken": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ──────────────────────────────────────────────────────────────────────────────
// OAuth
// ──────────────────────────────────────────────────────────────────────────────

fn google_profile(email: &str, subject: &str) -> OAuthProfile {
    OAuthProfile {
        provider: Provider::Google,
        provider_account_id: subject.to_string(),
        email: email.to_string(),
        name: Some("Grace".to_string()),
        image: None,
    }
}

#[tokio::test]
async fn oauth_provisions_then_reuses_the_account() {
    let app = common::spawn_app().await;

    let first = sign_in_with_oauth(&app.state, google_profile("Grace@Example.com", "g-1"))
        .await
        .unwrap();
    assert_eq!(first.user.email, "grace@example.com");
    assert!(first.user.email_verified.is_some());
    assert!(first.user.password.is_none());

    let second = sign_in_with_oauth(&app.state, google_profile("grace@example.com", "g-1"))
        .await
        .unwrap();
    assert_eq!(second.user.id, first.user.id);

    let users = user::Entity::find().count(&app.state.db).await.unwrap();
    let accounts = account::Entity::find().count(&app.state.db).await.unwrap();
    assert_eq!((users, accounts), (1, 1));

    let (status, me) = get(&app, "/api/v1/users/me", Some(&second.tokens.access_token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["isOAuth"], true);
}

#[tokio::test]
async fn oauth_refuses_an_email_held_by_another_account() {
    let app = common::spawn_app().await;
    seed_user(&app, UserSeed::verified("ada@example.com")).await;
    seed_oauth_user(&app, "grace@example.com", "github").await;

    for email in ["ada@example.com", "grace@example.com"] {
        let err = sign_in_with_oauth(&app.state, google_profile(email, "g-2"))
            .await
            .expect_err("email is taken");
        assert_eq!(err.message(), "Email already in use with different provider!");
    }
}

#[tokio::test]
async fn oauth_routes_check_the_provider() {
    let app = common::spawn_app().await;

    let (status, _) = get(&app, "/api/v1/auth/oauth/facebook", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, resp) = get(&app, "/api/v1/auth/oauth/google", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error_of(&resp), "google OAuth is not configured.");

    let (status, resp) = get(
        &app,
        "/api/v1/auth/oauth/github/callback?code=abc&state=forged",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_of(&resp), "Invalid or expired OAuth state.");
}
