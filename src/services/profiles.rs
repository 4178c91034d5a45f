//! "Who's watching" profiles under a user account.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::data::profil::get_owned_profil;
use crate::entities::profil;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateProfilInput {
    pub name: Option<String>,
    pub image: Option<String>,
}

/// All profiles of `user_id`, oldest first.
///
/// # Errors
///
/// `Internal` on database failure.
pub async fn list_profils(state: &AppState, user_id: Uuid) -> Result<Vec<profil::Model>, AppError> {
    Ok(profil::Entity::find()
        .filter(profil::Column::UserId.eq(user_id))
        .order_by_asc(profil::Column::CreatedAt)
        .all(&state.db)
        .await?)
}

/// Create a profile. It starts out selected when none of the user's profiles is.
///
/// # Errors
///
/// `Invalid fields!` for a blank name, or `Internal`.
pub async fn create_profil(
    state: &AppState,
    user_id: Uuid,
    input: CreateProfilInput,
) -> Result<profil::Model, AppError> {
    let name = input.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        tracing::info!(event = "profil_invalid_fields", %user_id, "Profile rejected");
        return Err(AppError::invalid_fields());
    }

    let selected = profil::Entity::find()
        .filter(profil::Column::UserId.eq(user_id))
        .filter(profil::Column::InUse.eq(true))
        .count(&state.db)
        .await?;

    let created = profil::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        name: Set(name.to_string()),
        image: Set(input.image.filter(|i| !i.trim().is_empty())),
        in_use: Set(selected == 0),
        favorite_ids: Set(profil::FavoriteIds::default()),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(&state.db)
    .await?;

    tracing::info!(event = "profil_created", %user_id, profil_id = %created.id, "Profile created");
    Ok(created)
}

/// Make `profil_id` the user's only in-use profile.
///
/// # Errors
///
/// `No profil found!` when the profile does not belong to the user, or `Internal`.
pub async fn select_profil(
    state: &AppState,
    user_id: Uuid,
    profil_id: Uuid,
) -> Result<profil::Model, AppError> {
    let Some(target) = get_owned_profil(&state.db, user_id, profil_id).await else {
        tracing::info!(event = "profil_not_found", %user_id, %profil_id, "Profile selection rejected");
        return Err(AppError::no_profil());
    };

    let txn = state.db.begin().await?;

    profil::Entity::update_many()
        .col_expr(profil::Column::InUse, Expr::value(false))
        .filter(profil::Column::UserId.eq(user_id))
        .exec(&txn)
        .await?;

    let mut active: profil::ActiveModel = target.into();
    active.in_use = Set(true);
    let selected = active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(event = "profil_selected", %user_id, %profil_id, "Profile selected");
    Ok(selected)
}

/// Delete one of the user's profiles along with its watch history.
///
/// # Errors
///
/// `No profil found!` when the profile does not belong to the user, or `Internal`.
pub async fn delete_profil(
    state: &AppState,
    user_id: Uuid,
    profil_id: Uuid,
) -> Result<(), AppError> {
    let Some(target) = get_owned_profil(&state.db, user_id, profil_id).await else {
        tracing::info!(event = "profil_not_found", %user_id, %profil_id, "Profile deletion rejected");
        return Err(AppError::no_profil());
    };

    target.delete(&state.db).await?;

    tracing::info!(event = "profil_deleted", %user_id, %profil_id, "Profile deleted");
    Ok(())
}
