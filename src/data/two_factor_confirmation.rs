use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::found;
use crate::entities::two_factor_confirmation;

pub async fn get_two_factor_confirmation_by_user_id<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Option<two_factor_confirmation::Model> {
    found(
        two_factor_confirmation::Entity::find()
            .filter(two_factor_confirmation::Column::UserId.eq(user_id))
            .one(db)
            .await,
        "two_factor_confirmation_by_user_id",
    )
}
