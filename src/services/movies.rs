//! Movie catalogue. Reads are open to any signed-in user; writes are admin-only.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, EntityTrait, ModelTrait, QueryOrder};
use serde::Deserialize;
use uuid::Uuid;

use crate::entities::movie;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMovieInput {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub genre: Option<String>,
    pub duration: Option<String>,
}

fn not_found() -> AppError {
    AppError::NotFound("Movie not found!".to_string())
}

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Every movie, newest first.
///
/// # Errors
///
/// `Internal` on database failure.
pub async fn list_movies(state: &AppState) -> Result<Vec<movie::Model>, AppError> {
    Ok(movie::Entity::find()
        .order_by_desc(movie::Column::CreatedAt)
        .all(&state.db)
        .await?)
}

/// # Errors
///
/// `Movie not found!` or `Internal`.
pub async fn get_movie(state: &AppState, movie_id: Uuid) -> Result<movie::Model, AppError> {
    movie::Entity::find_by_id(movie_id)
        .one(&state.db)
        .await?
        .ok_or_else(not_found)
}

/// Add a movie. Every field is required.
///
/// # Errors
///
/// `Invalid fields!` when any field is missing or blank, or `Internal`.
pub async fn create_movie(
    state: &AppState,
    input: CreateMovieInput,
) -> Result<movie::Model, AppError> {
    let (
        Some(title),
        Some(description),
        Some(video_url),
        Some(thumbnail_url),
        Some(genre),
        Some(duration),
    ) = (
        required(input.title),
        required(input.description),
        required(input.video_url),
        required(input.thumbnail_url),
        required(input.genre),
        required(input.duration),
    )
    else {
        tracing::info!(event = "movie_invalid_fields", "Movie rejected");
        return Err(AppError::invalid_fields());
    };

    let created = movie::ActiveModel {
        id: Set(Uuid::new_v4()),
        title: Set(title),
        description: Set(description),
        video_url: Set(video_url),
        thumbnail_url: Set(thumbnail_url),
        genre: Set(genre),
        duration: Set(duration),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(event = "movie_created", movie_id = %created.id, "Movie created");
    Ok(created)
}

/// # Errors
///
/// `Movie not found!` or `Internal`.
pub async fn delete_movie(state: &AppState, movie_id: Uuid) -> Result<(), AppError> {
    let existing = get_movie(state, movie_id).await?;
    existing.delete(&state.db).await?;

    tracing::info!(event = "movie_deleted", %movie_id, "Movie deleted");
    Ok(())
}
