#![allow(clippy::expect_used, clippy::unwrap_used)]

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;

use common::{PASSWORD, UserSeed, error_of, post_json, seed_oauth_user, seed_user, success_of};
use streamflix_api::entities::{
    refresh_token, two_factor_confirmation, two_factor_token, verification_token,
};
use streamflix_api::mail::EmailKind;
use streamflix_api::services::login::{self, LoginInput};

const LOGIN: &str = "/api/v1/auth/login";

async fn refresh_token_count(app: &common::TestApp) -> u64 {
    refresh_token::Entity::find()
        .count(&app.state.db)
        .await
        .unwrap()
}

// ──────────────────────────────────────────────────────────────────────────────
// Shape validation
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn malformed_input_is_rejected_without_side_effects() {
    let app = common::spawn_app().await;
    seed_user(&app, UserSeed::verified("ada@example.com")).await;

    let cases = [
        json!({ "email": "not-an-email", "password": PASSWORD }),
        json!({ "email": "ada@example.com", "password": "" }),
        json!({ "email": "", "password": PASSWORD }),
        json!({ "password": PASSWORD }),
        json!({ "email": "ada@example.com" }),
        json!({ "email": 42, "password": PASSWORD }),
    ];

    for body in &cases {
        let (status, resp) = post_json(&app, LOGIN, None, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case {body}");
        assert_eq!(error_of(&resp), "Invalid fields!", "case {body}");
    }

    assert_eq!(app.mailer.count(), 0);
    assert_eq!(refresh_token_count(&app).await, 0);
}

#[tokio::test]
async fn service_rejects_shape_before_touching_storage() {
    let app = common::spawn_app().await;

    let result = login::login(
        &app.state,
        LoginInput {
            email: Some("nope".to_string()),
            password: Some(PASSWORD.to_string()),
            code: None,
        },
    )
    .await;

    let err = result.expect_err("malformed email must fail");
    assert_eq!(err.message(), "Invalid fields!");
    assert_eq!(app.mailer.count(), 0);
}

// ──────────────────────────────────────────────────────────────────────────────
// Account lookup
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_email_does_not_exist() {
    let app = common::spawn_app().await;

    let (status, resp) = post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "ghost@example.com", "password": PASSWORD }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_of(&resp), "Email does not exist!");
}

#[tokio::test]
async fn oauth_only_account_cannot_use_password_login() {
    let app = common::spawn_app().await;
    seed_oauth_user(&app, "oauth@example.com", "google").await;

    for password in ["anything", PASSWORD] {
        let (status, resp) = post_json(
            &app,
            LOGIN,
            None,
            &json!({ "email": "oauth@example.com", "password": password }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_of(&resp), "Email does not exist!");
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// Email verification gate
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn unverified_user_gets_confirmation_email_and_no_session() {
    let app = common::spawn_app().await;
    let user = seed_user(
        &app,
        UserSeed {
            verified: false,
            ..UserSeed::verified("new@example.com")
        },
    )
    .await;

    let (status, resp) = post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "new@example.com", "password": PASSWORD }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(success_of(&resp), "Confirmation email sent!");
    assert!(resp.get("token").is_none());
    assert_eq!(refresh_token_count(&app).await, 0);

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].kind, EmailKind::Verification);
    assert_eq!(sent[0].to, "new@example.com");

    let stored = verification_token::Entity::find()
        .filter(verification_token::Column::UserId.eq(user.id))
        .all(&app.state.db)
        .await
        .unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn repeated_unverified_logins_keep_one_verification_token() {
    let app = common::spawn_app().await;
    seed_user(
        &app,
        UserSeed {
            verified: false,
            ..UserSeed::verified("new@example.com")
        },
    )
    .await;

    let body = json!({ "email": "new@example.com", "password": PASSWORD });
    post_json(&app, LOGIN, None, &body).await;
    post_json(&app, LOGIN, None, &body).await;

    let count = verification_token::Entity::find()
        .count(&app.state.db)
        .await
        .unwrap();
    assert_eq!(count, 1);
    assert_eq!(app.mailer.count(), 2);
}

// ──────────────────────────────────────────────────────────────────────────────
// Two-factor gate
// ──────────────────────────────────────────────────────────────────────────────

fn two_factor_seed(email: &str) -> UserSeed<'_> {
    UserSeed {
        two_factor: true,
        ..UserSeed::verified(email)
    }
}

#[tokio::test]
async fn two_factor_without_code_mails_a_code_and_does_not_sign_in() {
    let app = common::spawn_app().await;
    seed_user(&app, two_factor_seed("tf@example.com")).await;

    let (status, resp) = post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "tf@example.com", "password": PASSWORD }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(resp, json!({ "twoFactor": true }));
    assert_eq!(refresh_token_count(&app).await, 0);

    let code = app
        .mailer
        .last_secret(EmailKind::TwoFactorCode)
        .expect("code mailed");
    assert_eq!(code.len(), 6);
}

#[tokio::test]
async fn two_factor_with_wrong_code_is_invalid() {
    let app = common::spawn_app().await;
    seed_user(&app, two_factor_seed("tf@example.com")).await;
    let body = json!({ "email": "tf@example.com", "password": PASSWORD });
    post_json(&app, LOGIN, None, &body).await;

    let (status, resp) = post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "tf@example.com", "password": PASSWORD, "code": "000000" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&resp), "Invalid code!");
}

#[tokio::test]
async fn two_factor_code_without_stored_token_is_invalid() {
    let app = common::spawn_app().await;
    seed_user(&app, two_factor_seed("tf@example.com")).await;

    let (status, resp) = post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "tf@example.com", "password": PASSWORD, "code": "123456" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&resp), "Invalid code!");
}

#[tokio::test]
async fn two_factor_with_expired_matching_code_has_expired() {
    let app = common::spawn_app().await;
    seed_user(&app, two_factor_seed("tf@example.com")).await;
    post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "tf@example.com", "password": PASSWORD }),
    )
    .await;

    let token = two_factor_token::Entity::find()
        .one(&app.state.db)
        .await
        .unwrap()
        .expect("token stored");
    let code = token.token.clone();
    let mut expired: two_factor_token::ActiveModel = token.into();
    expired.expires = Set((Utc::now() - Duration::minutes(1)).fixed_offset());
    expired.update(&app.state.db).await.unwrap();

    let (status, resp) = post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "tf@example.com", "password": PASSWORD, "code": code }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&resp), "Code has expired!");
    assert_eq!(refresh_token_count(&app).await, 0);
}

#[tokio::test]
async fn two_factor_with_valid_code_signs_in_and_consumes_state() {
    let app = common::spawn_app().await;
    let user = seed_user(&app, two_factor_seed("tf@example.com")).await;
    post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "tf@example.com", "password": PASSWORD }),
    )
    .await;
    let code = app.mailer.last_secret(EmailKind::TwoFactorCode).unwrap();

    let (status, resp) = post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "tf@example.com", "password": PASSWORD, "code": code }),
    )
    .await;

    assert_eq!(status, StatusCode::OK, "{resp}");
    assert_eq!(success_of(&resp), "Logged in!");
    assert_eq!(resp["user"]["id"], json!(user.id));

    let tokens_left = two_factor_token::Entity::find()
        .count(&app.state.db)
        .await
        .unwrap();
    let confirmations_left = two_factor_confirmation::Entity::find()
        .count(&app.state.db)
        .await
        .unwrap();
    assert_eq!(tokens_left, 0);
    assert_eq!(confirmations_left, 0);
    assert_eq!(refresh_token_count(&app).await, 1);
}

#[tokio::test]
async fn two_factor_code_with_wrong_password_is_invalid_credentials() {
    let app = common::spawn_app().await;
    seed_user(&app, two_factor_seed("tf@example.com")).await;
    post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "tf@example.com", "password": PASSWORD }),
    )
    .await;
    let code = app.mailer.last_secret(EmailKind::TwoFactorCode).unwrap();

    let (status, resp) = post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "tf@example.com", "password": "wrong-password", "code": code }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&resp), "Invalid credentials!");
}

// ──────────────────────────────────────────────────────────────────────────────
// Credential sign-in
// ──────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let app = common::spawn_app().await;
    seed_user(&app, UserSeed::verified("ada@example.com")).await;

    let (status, resp) = post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "ada@example.com", "password": "not-the-password" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_of(&resp), "Invalid credentials!");
    assert_eq!(refresh_token_count(&app).await, 0);
}

#[tokio::test]
async fn successful_login_returns_a_working_session() {
    let app = common::spawn_app().await;
    seed_user(&app, UserSeed::verified("ada@example.com")).await;

    let (status, resp) = post_json(
        &app,
        LOGIN,
        None,
        &json!({ "email": "  ADA@example.com ", "password": PASSWORD }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(success_of(&resp), "Logged in!");
    assert_eq!(resp["user"]["email"], "ada@example.com");
    assert!(resp["user"].get("password").is_none());

    let token = resp["token"].as_str().unwrap();
    let (status, me) = common::get(&app, "/api/v1/users/me", Some(token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["email"], "ada@example.com");
    assert_eq!(me["isOAuth"], false);
}
