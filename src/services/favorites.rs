//! Favorite movies of the user's active profile.

use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::Set;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::data::profil::get_active_profil;
use crate::entities::{movie, profil};
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteInput {
    /// Required, but an empty string is accepted at this stage.
    pub movie_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoritesResponse {
    pub favorite_ids: Vec<Uuid>,
}

async fn find_movie(state: &AppState, raw_id: &str) -> Result<Option<movie::Model>, AppError> {
    let Ok(movie_id) = raw_id.parse::<Uuid>() else {
        return Ok(None);
    };
    Ok(movie::Entity::find_by_id(movie_id).one(&state.db).await?)
}

/// Append a movie to the active profile's favorites.
///
/// Duplicates are not filtered: the list is append-only here.
///
/// # Errors
///
/// `Invalid fields!` for a missing id or unknown movie, `No profil found!`, or `Internal`.
pub async fn add_favorite(
    state: &AppState,
    user_id: Uuid,
    input: FavoriteInput,
) -> Result<FavoritesResponse, AppError> {
    let Some(raw_id) = input.movie_id else {
        tracing::info!(event = "favorite_invalid_fields", %user_id, "Favorite rejected");
        return Err(AppError::invalid_fields());
    };

    let Some(active) = get_active_profil(&state.db, user_id).await else {
        tracing::info!(event = "favorite_no_profil", %user_id, "Favorite rejected");
        return Err(AppError::no_profil());
    };

    let Some(found) = find_movie(state, &raw_id).await? else {
        tracing::info!(event = "favorite_movie_not_found", %user_id, movie_id = %raw_id, "Favorite rejected");
        return Err(AppError::invalid_fields());
    };

    let mut favorite_ids = active.favorite_ids.0.clone();
    favorite_ids.push(found.id);

    let mut model: profil::ActiveModel = active.into();
    model.favorite_ids = Set(profil::FavoriteIds(favorite_ids));
    let updated = model.update(&state.db).await?;

    tracing::info!(event = "favorite_added", %user_id, profil_id = %updated.id, movie_id = %found.id, "Favorite added");
    Ok(FavoritesResponse {
        favorite_ids: updated.favorite_ids.0,
    })
}

/// Remove every occurrence of `movie_id` from the active profile's favorites.
///
/// # Errors
///
/// `No profil found!` or `Internal`.
pub async fn remove_favorite(
    state: &AppState,
    user_id: Uuid,
    movie_id: Uuid,
) -> Result<FavoritesResponse, AppError> {
    let Some(active) = get_active_profil(&state.db, user_id).await else {
        return Err(AppError::no_profil());
    };

    let mut favorite_ids = active.favorite_ids.0.clone();
    favorite_ids.retain(|id| *id != movie_id);

    let mut model: profil::ActiveModel = active.into();
    model.favorite_ids = Set(profil::FavoriteIds(favorite_ids));
    let updated = model.update(&state.db).await?;

    tracing::info!(event = "favorite_removed", %user_id, profil_id = %updated.id, %movie_id, "Favorite removed");
    Ok(FavoritesResponse {
        favorite_ids: updated.favorite_ids.0,
    })
}

/// Movies in the active profile's favorites, in the order they were added.
///
/// Ids whose movie has since been deleted are skipped.
///
/// # Errors
///
/// `No profil found!` or `Internal`.
pub async fn list_favorites(state: &AppState, user_id: Uuid) -> Result<Vec<movie::Model>, AppError> {
    let Some(active) = get_active_profil(&state.db, user_id).await else {
        return Err(AppError::no_profil());
    };
    let ids = active.favorite_ids.0;
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    let movies = movie::Entity::find()
        .filter(movie::Column::Id.is_in(ids.clone()))
        .all(&state.db)
        .await?;

    Ok(ids
        .iter()
        .filter_map(|id| movies.iter().find(|m| m.id == *id).cloned())
        .collect())
}
