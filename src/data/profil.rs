use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::found;
use crate::entities::profil;

/// The profile the user currently has selected, if any.
pub async fn get_active_profil<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Option<profil::Model> {
    found(
        profil::Entity::find()
            .filter(profil::Column::UserId.eq(user_id))
            .filter(profil::Column::InUse.eq(true))
            .one(db)
            .await,
        "active_profil",
    )
}

/// A profile by id, only if it belongs to `user_id`.
pub async fn get_owned_profil<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    profil_id: Uuid,
) -> Option<profil::Model> {
    found(
        profil::Entity::find_by_id(profil_id)
            .filter(profil::Column::UserId.eq(user_id))
            .one(db)
            .await,
        "owned_profil",
    )
}
