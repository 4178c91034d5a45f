use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use uuid::Uuid;

use crate::auth::middleware::AuthUser;
use crate::error::AppError;
use crate::routes::extract::FormJson;
use crate::services::SuccessResponse;
use crate::services::watch_time::{self, WatchTimeInput, WatchTimeResponse, WatchTimeWrite};
use crate::state::AppState;

/// Build the watch-time route group: `/watch-time/...`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(record_watch_time))
        .route("/{movie_id}", get(get_watch_time))
}

/// `POST /api/v1/watch-time`
async fn record_watch_time(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    FormJson(body): FormJson<WatchTimeInput>,
) -> Result<(StatusCode, Json<SuccessResponse>), AppError> {
    let status = match watch_time::record_watch_time(&state, user_model.id, body).await? {
        WatchTimeWrite::Created => StatusCode::CREATED,
        WatchTimeWrite::Updated => StatusCode::OK,
    };
    Ok((status, Json(SuccessResponse::new("Watch time saved!"))))
}

/// `GET /api/v1/watch-time/{movie_id}`
async fn get_watch_time(
    State(state): State<AppState>,
    AuthUser(user_model): AuthUser,
    Path(movie_id): Path<Uuid>,
) -> Result<Json<WatchTimeResponse>, AppError> {
    Ok(Json(
        watch_time::get_watch_time(&state, user_model.id, movie_id).await?,
    ))
}
