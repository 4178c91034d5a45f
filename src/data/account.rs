use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};
use uuid::Uuid;

use super::found;
use crate::entities::account;

/// First linked OAuth account of a user. Its presence is what marks a user as OAuth-provisioned.
pub async fn get_account_by_user_id<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
) -> Option<account::Model> {
    found(
        account::Entity::find()
            .filter(account::Column::UserId.eq(user_id))
            .one(db)
            .await,
        "account_by_user_id",
    )
}

pub async fn get_account_by_provider<C: ConnectionTrait>(
    db: &C,
    provider: &str,
    provider_account_id: &str,
) -> Option<account::Model> {
    found(
        account::Entity::find()
            .filter(account::Column::Provider.eq(provider))
            .filter(account::Column::ProviderAccountId.eq(provider_account_id))
            .one(db)
            .await,
        "account_by_provider",
    )
}
