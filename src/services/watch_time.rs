//! Playback position per (user, profile, movie).

use chrono::Utc;
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::profil::get_active_profil;
use crate::entities::{movie, movie_watch_time};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchTimeInput {
    pub movie_id: Option<String>,
    /// Seconds into the movie.
    pub watch_time: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchTimeResponse {
    pub movie_id: Uuid,
    pub time: f64,
}

/// Whether the stored row was created or overwritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchTimeWrite {
    Created,
    Updated,
}

fn parse_input(input: WatchTimeInput) -> Option<(Uuid, f64)> {
    let movie_id = input.movie_id.filter(|id| !id.trim().is_empty())?;
    let time = input.watch_time.filter(|t| t.is_finite() && *t >= 0.0)?;
    Some((movie_id.trim().parse().ok()?, time))
}

async fn find_row(
    state: &AppState,
    user_id: Uuid,
    profil_id: Uuid,
    movie_id: Uuid,
) -> Result<Option<movie_watch_time::Model>, AppError> {
    Ok(movie_watch_time::Entity::find()
        .filter(movie_watch_time::Column::UserId.eq(user_id))
        .filter(movie_watch_time::Column::ProfilId.eq(profil_id))
        .filter(movie_watch_time::Column::MovieId.eq(movie_id))
        .one(&state.db)
        .await?)
}

/// Record the playback position for the active profile.
///
/// Creates the row on first call and overwrites its time afterwards, so there is
/// never more than one row per (user, profile, movie).
///
/// # Errors
///
/// `Invalid fields!` for a bad input or unknown movie, `No profil found!`, or `Internal`.
pub async fn record_watch_time(
    state: &AppState,
    user_id: Uuid,
    input: WatchTimeInput,
) -> Result<WatchTimeWrite, AppError> {
    let Some((movie_id, time)) = parse_input(input) else {
        tracing::info!(event = "watch_time_invalid_fields", %user_id, "Watch time rejected");
        return Err(AppError::invalid_fields());
    };

    let Some(active) = get_active_profil(&state.db, user_id).await else {
        tracing::info!(event = "watch_time_no_profil", %user_id, "Watch time rejected");
        return Err(AppError::no_profil());
    };

    if movie::Entity::find_by_id(movie_id)
        .one(&state.db)
        .await?
        .is_none()
    {
        tracing::info!(event = "watch_time_movie_not_found", %user_id, %movie_id, "Watch time rejected");
        return Err(AppError::invalid_fields());
    }

    let now = Utc::now().fixed_offset();
    if let Some(existing) = find_row(state, user_id, active.id, movie_id).await? {
        let mut row: movie_watch_time::ActiveModel = existing.into();
        row.time = Set(time);
        row.updated_at = Set(now);
        row.update(&state.db).await?;
        tracing::info!(event = "watch_time_updated", %user_id, profil_id = %active.id, %movie_id, time, "Watch time updated");
        return Ok(WatchTimeWrite::Updated);
    }

    movie_watch_time::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        profil_id: Set(active.id),
        movie_id: Set(movie_id),
        time: Set(time),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;
    tracing::info!(event = "watch_time_created", %user_id, profil_id = %active.id, %movie_id, time, "Watch time created");
    Ok(WatchTimeWrite::Created)
}

/// Stored playback position for the active profile, or `0` when none was recorded.
///
/// # Errors
///
/// `No profil found!` or `Internal`.
pub async fn get_watch_time(
    state: &AppState,
    user_id: Uuid,
    movie_id: Uuid,
) -> Result<WatchTimeResponse, AppError> {
    let Some(active) = get_active_profil(&state.db, user_id).await else {
        return Err(AppError::no_profil());
    };

    let time = find_row(state, user_id, active.id, movie_id)
        .await?
        .map_or(0.0, |row| row.time);

    Ok(WatchTimeResponse { movie_id, time })
}
