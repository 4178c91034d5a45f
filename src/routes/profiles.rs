use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::entities::profil;
use crate::error::AppError;
use crate::routes::extract::FormJson;
use crate::services::profiles::{self, CreateProfilInput};
use crate::state::AppState;

/// Build the profile route group: `/profiles/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_profils).post(create_profil))
        .route("/{id}", delete(delete_profil))
        .route("/{id}/select", post(select_profil))
}

/// `GET /api/v1/profiles`
async fn list_profils(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
) -> Result<Json<Vec<profil::Model>>, AppError> {
    Ok(Json(profiles::list_profils(&state, user_model.id).await?))
}

/// `POST /api/v1/profiles`
async fn create_profil(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    FormJson(body): FormJson<CreateProfilInput>,
) -> Result<(StatusCode, Json<profil::Model>), AppError> {
    let created = profiles::create_profil(&state, user_model.id, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/v1/profiles/{id}/select`
async fn select_profil(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<profil::Model>, AppError> {
    Ok(Json(profiles::select_profil(&state, user_model.id, id).await?))
}

/// `DELETE /api/v1/profiles/{id}`
async fn delete_profil(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    profiles::delete_profil(&state, user_model.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
