use axum::extract::State;
use axum::routing::{get, patch};
use axum::{Json, Router};

use crate::auth::middleware::AuthUser;
use crate::data::account::get_account_by_user_id;
use crate::error::AppError;
use crate::routes::extract::FormJson;
use crate::services::settings::{self, SettingsInput, SettingsOutcome};
use crate::services::{SuccessResponse, UserResponse};
use crate::state::AppState;

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Build the user route group: `/users/...`
pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(get_me))
}

/// Build the settings route: `/settings`
pub fn settings_router() -> Router<AppState> {
    Router::new().route("/settings", patch(update_settings))
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// `GET /api/v1/users/me`
async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
) -> Json<UserResponse> {
    let is_oauth = get_account_by_user_id(&state.db, user_model.id)
        .await
        .is_some();
    Json(UserResponse::new(&user_model, is_oauth))
}

/// `PATCH /api/v1/settings`
async fn update_settings(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    FormJson(body): FormJson<SettingsInput>,
) -> Result<Json<SuccessResponse>, AppError> {
    let message = match settings::update_settings(&state, user_model.id, body).await? {
        SettingsOutcome::VerificationSent => "Verification email sent!",
        SettingsOutcome::Updated(_) => "Settings Updated!",
    };
    Ok(Json(SuccessResponse::new(message)))
}
