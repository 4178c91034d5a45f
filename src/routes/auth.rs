use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use oauth2::{AuthorizationCode, CsrfToken, TokenResponse};
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::Set;
use sea_orm::EntityTrait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::jwt;
use crate::auth::middleware::AuthUser;
use crate::auth::oauth::Provider;
use crate::auth::session::{self, Session};
use crate::data::user::get_user_by_id;
use crate::entities::refresh_token;
use crate::error::AppError;
use crate::routes::extract::FormJson;
use crate::services::login::{self, LoginInput, LoginOutcome};
use crate::services::password_reset::{self, NewPasswordInput, ResetInput};
use crate::services::register::{self, RegisterInput};
use crate::services::verification::{self, NewVerificationInput};
use crate::services::{SuccessResponse, UserResponse, oauth as oauth_service};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the auth route group: `/auth/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login_handler))
        .route("/register", post(register_handler))
        .route("/new-verification", post(new_verification))
        .route("/reset", post(reset))
        .route("/new-password", post(new_password))
        .route("/oauth/{provider}", get(oauth_initiate))
        .route("/oauth/{provider}/callback", get(oauth_callback))
        .route("/refresh", post(refresh_token_handler))
        .route("/signout", post(signout))
}

// ─────────────────────────────────────────────────────────────────────────────
// DTOs
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TwoFactorResponse {
    two_factor: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthResponse {
    success: String,
    user: UserResponse,
    token: String,
    refresh_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OAuthInitiateQuery {
    redirect_uri: Option<String>,
}

#[derive(Deserialize)]
struct OAuthCallbackQuery {
    code: String,
    state: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequestBody {
    refresh_token: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshResponse {
    token: String,
    refresh_token: String,
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn auth_response(session: Session, is_oauth: bool) -> AuthResponse {
    AuthResponse {
        success: "Logged in!".to_string(),
        user: UserResponse::new(&session.user, is_oauth),
        token: session.tokens.access_token,
        refresh_token: session.tokens.refresh_token,
    }
}

fn parse_provider(raw: &str) -> Result<Provider, AppError> {
    raw.parse()
        .map_err(|_| AppError::NotFound(format!("Unsupported provider: {raw}")))
}

async fn revoke(state: &AppState, record: refresh_token::Model) -> Result<(), AppError> {
    let mut active_token: refresh_token::ActiveModel = record.into();
    active_token.revoked_at = Set(Some(Utc::now().fixed_offset()));
    active_token.update(&state.db).await?;
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `POST /api/v1/auth/login`
async fn login_handler(
    State(state): State<AppState>,
    FormJson(body): FormJson<LoginInput>,
) -> Result<Response, AppError> {
    let response = match login::login(&state, body).await? {
        LoginOutcome::ConfirmationSent => {
            Json(SuccessResponse::new("Confirmation email sent!")).into_response()
        }
        LoginOutcome::TwoFactorRequired => {
            Json(TwoFactorResponse { two_factor: true }).into_response()
        }
        LoginOutcome::SignedIn(session) => Json(auth_response(session, false)).into_response(),
    };
    Ok(response)
}

/// `POST /api/v1/auth/register`
async fn register_handler(
    State(state): State<AppState>,
    FormJson(body): FormJson<RegisterInput>,
) -> Result<(StatusCode, Json<SuccessResponse>), AppError> {
    register::register(&state, body).await?;
    Ok((
        StatusCode::CREATED,
        Json(SuccessResponse::new("Confirmation email sent!")),
    ))
}

/// `POST /api/v1/auth/new-verification`
async fn new_verification(
    State(state): State<AppState>,
    FormJson(body): FormJson<NewVerificationInput>,
) -> Result<Json<SuccessResponse>, AppError> {
    verification::new_verification(&state, body).await?;
    Ok(Json(SuccessResponse::new("Email verified!")))
}

/// `POST /api/v1/auth/reset`
async fn reset(
    State(state): State<AppState>,
    FormJson(body): FormJson<ResetInput>,
) -> Result<Json<SuccessResponse>, AppError> {
    password_reset::reset(&state, body).await?;
    Ok(Json(SuccessResponse::new("Reset email sent!")))
}

/// `POST /api/v1/auth/new-password`
async fn new_password(
    State(state): State<AppState>,
    FormJson(body): FormJson<NewPasswordInput>,
) -> Result<Json<SuccessResponse>, AppError> {
    password_reset::new_password(&state, body).await?;
    Ok(Json(SuccessResponse::new("Password updated!")))
}

/// `GET /api/v1/auth/oauth/{provider}`
async fn oauth_initiate(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthInitiateQuery>,
) -> Result<Response, AppError> {
    let provider = parse_provider(&provider)?;
    if !provider.is_configured(&state.config) {
        return Err(AppError::UnprocessableEntity(format!(
            "{provider} OAuth is not configured."
        )));
    }

    let client = provider.client(&state.config)?;
    let state_token = jwt::generate_oauth_state(
        &state.config.jwt_secret,
        provider.as_str(),
        query.redirect_uri.as_deref(),
    )?;

    let (auth_url, _csrf) = client
        .authorize_url(|| CsrfToken::new(state_token))
        .add_scopes(provider.scopes())
        .url();

    Ok(Redirect::to(auth_url.as_str()).into_response())
}

/// `GET /api/v1/auth/oauth/{provider}/callback`
async fn oauth_callback(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(query): Query<OAuthCallbackQuery>,
) -> Result<Response, AppError> {
    let provider = parse_provider(&provider)?;
    let state_claims =
        jwt::validate_oauth_state(&query.state, &state.config.jwt_secret, provider.as_str())
            .map_err(|_| AppError::BadRequest("Invalid or expired OAuth state.".to_string()))?;

    let client = provider.client(&state.config)?;
    let token_result = client
        .exchange_code(AuthorizationCode::new(query.code))
        .request_async(&reqwest::Client::new())
        .await
        .map_err(|e| AppError::BadRequest(format!("Failed to exchange authorization code: {e}")))?;

    let profile = provider
        .fetch_profile(token_result.access_token().secret())
        .await?;
    let session = oauth_service::sign_in_with_oauth(&state, profile).await?;
    let body = auth_response(session, true);

    // Redirect back to the frontend when the client asked for it
    if let Some(redirect_uri) = state_claims.redirect_uri {
        let user_json = serde_json::to_string(&body.user)?;
        let redirect_url = format!(
            "{}?provider={}&token={}&refreshToken={}&user={}",
            redirect_uri,
            provider,
            urlencoding::encode(&body.token),
            urlencoding::encode(&body.refresh_token),
            urlencoding::encode(&user_json)
        );
        return Ok(Redirect::to(&redirect_url).into_response());
    }

    Ok(Json(body).into_response())
}

/// `POST /api/v1/auth/refresh`
async fn refresh_token_handler(
    State(state): State<AppState>,
    FormJson(body): FormJson<RefreshRequestBody>,
) -> Result<Json<RefreshResponse>, AppError> {
    let claims = jwt::validate_refresh_token(&body.refresh_token, &state.config.jwt_secret)
        .map_err(|_| AppError::unauthorized())?;
    let jti: Uuid = claims.jti.parse().map_err(|_| AppError::unauthorized())?;

    let token_record = refresh_token::Entity::find_by_id(jti)
        .one(&state.db)
        .await?
        .ok_or_else(AppError::unauthorized)?;

    if token_record.revoked_at.is_some() || token_record.expires_at < Utc::now() {
        tracing::info!(event = "refresh_rejected", %jti, "Refresh token no longer valid");
        return Err(AppError::unauthorized());
    }

    let user_id = token_record.user_id;
    revoke(&state, token_record).await?;

    let Some(user_model) = get_user_by_id(&state.db, user_id).await else {
        return Err(AppError::unauthorized());
    };

    let pair = session::issue_tokens(&state.db, &state.config, &user_model).await?;
    tracing::info!(event = "refresh_success", %user_id, "Session refreshed");

    Ok(Json(RefreshResponse {
        token: pair.access_token,
        refresh_token: pair.refresh_token,
    }))
}

/// `POST /api/v1/auth/signout`
async fn signout(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    FormJson(body): FormJson<RefreshRequestBody>,
) -> Result<StatusCode, AppError> {
    if let Ok(claims) = jwt::validate_refresh_token(&body.refresh_token, &state.config.jwt_secret)
        && let Ok(jti) = claims.jti.parse::<Uuid>()
        && let Some(record) = refresh_token::Entity::find_by_id(jti).one(&state.db).await?
        && record.user_id == user_model.id
        && record.revoked_at.is_none()
    {
        revoke(&state, record).await?;
    }

    tracing::info!(event = "signout", user_id = %user_model.id, "User signed out");
    Ok(StatusCode::NO_CONTENT)
}
