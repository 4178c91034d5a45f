use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::found;
use crate::entities::user;

pub async fn get_user_by_email<C: ConnectionTrait>(db: &C, email: &str) -> Option<user::Model> {
    found(
        user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(db)
            .await,
        "user_by_email",
    )
}

pub async fn get_user_by_id<C: ConnectionTrait>(db: &C, id: Uuid) -> Option<user::Model> {
    found(user::Entity::find_by_id(id).one(db).await, "user_by_id")
}
