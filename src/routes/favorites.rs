use axum::extract::{Path, State};
use axum::routing::{delete, get};
use axum::{Json, Router};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::entities::movie;
use crate::error::AppError;
use crate::routes::extract::FormJson;
use crate::services::favorites::{self, FavoriteInput, FavoritesResponse};
use crate::state::AppState;

/// Build the favorites route group: `/favorites/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_favorites).post(add_favorite))
        .route("/{movie_id}", delete(remove_favorite))
}

/// `GET /api/v1/favorites`
async fn list_favorites(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
) -> Result<Json<Vec<movie::Model>>, AppError> {
    Ok(Json(favorites::list_favorites(&state, user_model.id).await?))
}

/// `POST /api/v1/favorites`
async fn add_favorite(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    FormJson(body): FormJson<FavoriteInput>,
) -> Result<Json<FavoritesResponse>, AppError> {
    Ok(Json(
        favorites::add_favorite(&state, user_model.id, body).await?,
    ))
}

/// `DELETE /api/v1/favorites/{movie_id}`
async fn remove_favorite(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<FavoritesResponse>, AppError> {
    Ok(Json(
        favorites::remove_favorite(&state, user_model.id, movie_id).await?,
    ))
}
