use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::auth::middleware::{AdminUser, AuthUser};
use crate::entities::movie;
use crate::error::AppError;
use crate::routes::extract::FormJson;
use crate::services::movies::{self, CreateMovieInput};
use crate::state::AppState;

/// Build the movie route group: `/movies/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_movies).post(create_movie))
        .route("/{id}", get(get_movie).delete(delete_movie))
}

/// `GET /api/v1/movies`
async fn list_movies(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
) -> Result<Json<Vec<movie::Model>>, AppError> {
    Ok(Json(movies::list_movies(&state).await?))
}

/// `GET /api/v1/movies/{id}`
async fn get_movie(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<movie::Model>, AppError> {
    Ok(Json(movies::get_movie(&state, id).await?))
}

/// `POST /api/v1/movies` (admin)
async fn create_movie(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    FormJson(body): FormJson<CreateMovieInput>,
) -> Result<(StatusCode, Json<movie::Model>), AppError> {
    let created = movies::create_movie(&state, body).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `DELETE /api/v1/movies/{id}` (admin)
async fn delete_movie(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    movies::delete_movie(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
