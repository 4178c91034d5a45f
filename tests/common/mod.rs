#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::Set;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use streamflix_api::auth::{password, session};
use streamflix_api::config::{Config, Environment};
use streamflix_api::entities::{account, movie, profil, user};
use streamflix_api::mail::{Email, EmailKind, Mailer};
use streamflix_api::state::AppState;

pub const PASSWORD: &str = "hunter22";

/// Mailer double that keeps every message instead of sending it.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<Email>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<Email> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn count(&self) -> usize {
        self.sent().len()
    }

    /// The token or code carried by the last email of `kind`.
    pub fn last_secret(&self, kind: EmailKind) -> Option<String> {
        let email = self.sent().into_iter().rev().find(|e| e.kind == kind)?;
        match kind {
            EmailKind::TwoFactorCode => email
                .html
                .split(": ")
                .nth(1)
                .map(|rest| rest.trim_end_matches("</p>").to_string()),
            EmailKind::Verification | EmailKind::PasswordReset => email
                .html
                .split("token=")
                .nth(1)
                .and_then(|rest| rest.split('"').next())
                .map(String::from),
        }
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, email: Email) -> anyhow::Result<()> {
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(email);
        }
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub mailer: Arc<RecordingMailer>,
}

pub fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        server_host: std::net::IpAddr::from([127, 0, 0, 1]),
        server_port: 0,
        environment: Environment::Development,
        log_level: "warn".to_string(),
        jwt_secret: "test-secret-key-for-testing-only-32chars".to_string(),
        jwt_access_expiration_secs: 900,
        jwt_refresh_expiration_secs: 604_800,
        google_client_id: String::new(),
        google_client_secret: String::new(),
        google_redirect_uri: String::new(),
        github_client_id: String::new(),
        github_client_secret: String::new(),
        github_redirect_uri: String::new(),
        frontend_url: "http://localhost:3001".to_string(),
        smtp: None,
    }
}

/// Router over a fresh in-memory database with all migrations applied.
pub async fn spawn_app() -> TestApp {
    let db = streamflix_api::db::connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");

    let mailer = Arc::new(RecordingMailer::default());
    let state = AppState {
        db,
        config: test_config(),
        mailer: mailer.clone(),
    };
    let router = streamflix_api::routes::router().with_state(state.clone());

    TestApp {
        router,
        state,
        mailer,
    }
}

/// Send a request and return (status, body). Non-JSON bodies come back as a JSON string.
pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<&Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("build request");

    let response = app
        .router
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let bytes = response
        .into_body()
        .collect()
        .await
        .map(http_body_util::Collected::to_bytes)
        .unwrap_or_default();
    let text = String::from_utf8(bytes.to_vec()).unwrap_or_default();
    let json = serde_json::from_str(&text).unwrap_or(Value::String(text));

    (status, json)
}

pub async fn get(app: &TestApp, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::GET, uri, token, None).await
}

pub async fn post_json(
    app: &TestApp,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> (StatusCode, Value) {
    send(app, Method::POST, uri, token, Some(body)).await
}

pub async fn patch_json(
    app: &TestApp,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> (StatusCode, Value) {
    send(app, Method::PATCH, uri, token, Some(body)).await
}

pub async fn delete(app: &TestApp, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
    send(app, Method::DELETE, uri, token, None).await
}

/// Options for [`seed_user`].
#[derive(Debug, Clone, Copy)]
pub struct UserSeed<'a> {
    pub email: &'a str,
    pub verified: bool,
    pub two_factor: bool,
    pub role: user::UserRole,
}

impl<'a> UserSeed<'a> {
    pub fn verified(email: &'a str) -> Self {
        Self {
            email,
            verified: true,
            two_factor: false,
            role: user::UserRole::User,
        }
    }
}

/// Insert a credentials user whose password is [`PASSWORD`].
pub async fn seed_user(app: &TestApp, seed: UserSeed<'_>) -> user::Model {
    let now = Utc::now().fixed_offset();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(Some("Test User".to_string())),
        email: Set(seed.email.to_string()),
        email_verified: Set(seed.verified.then_some(now)),
        image: Set(None),
        password: Set(Some(password::hash_password(PASSWORD).expect("hash"))),
        role: Set(seed.role),
        is_two_factor_enabled: Set(seed.two_factor),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&app.state.db)
    .await
    .expect("insert user")
}

/// Insert a user provisioned through `provider`: verified, no password, one linked account.
pub async fn seed_oauth_user(app: &TestApp, email: &str, provider: &str) -> user::Model {
    let now = Utc::now().fixed_offset();
    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(Some("OAuth User".to_string())),
        email: Set(email.to_string()),
        email_verified: Set(Some(now)),
        image: Set(None),
        password: Set(None),
        role: Set(user::UserRole::User),
        is_two_factor_enabled: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&app.state.db)
    .await
    .expect("insert oauth user");

    account::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(created.id),
        provider: Set(provider.to_string()),
        provider_account_id: Set(format!("{provider}-{}", created.id)),
        created_at: Set(now),
    }
    .insert(&app.state.db)
    .await
    .expect("insert account");

    created
}

pub async fn seed_movie(app: &TestApp, title: &str) -> movie::Model {
    movie::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title.to_string()),
        description: Set(format!("{title} description")),
        video_url: Set(format!("https://cdn.example.com/{title}.mp4")),
        thumbnail_url: Set(format!("https://cdn.example.com/{title}.jpg")),
        genre: Set("Drama".to_string()),
        duration: Set("2 hours".to_string()),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&app.state.db)
    .await
    .expect("insert movie")
}

pub async fn seed_profil(app: &TestApp, user_id: Uuid, name: &str, in_use: bool) -> profil::Model {
    profil::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        name: Set(name.to_string()),
        image: Set(None),
        in_use: Set(in_use),
        favorite_ids: Set(profil::FavoriteIds::default()),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&app.state.db)
    .await
    .expect("insert profil")
}

/// Access token for `user_model`, issued the same way a sign-in does.
pub async fn token_for(app: &TestApp, user_model: &user::Model) -> String {
    session::issue_tokens(&app.state.db, &app.state.config, user_model)
        .await
        .expect("issue tokens")
        .access_token
}

pub fn error_of(body: &Value) -> &str {
    body["error"].as_str().unwrap_or_default()
}

pub fn success_of(body: &Value) -> &str {
    body["success"].as_str().unwrap_or_default()
}
