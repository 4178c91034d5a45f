use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use super::found;
use crate::entities::{password_reset_token, two_factor_token, verification_token};

pub async fn get_verification_token_by_token<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Option<verification_token::Model> {
    found(
        verification_token::Entity::find()
            .filter(verification_token::Column::Token.eq(token))
            .one(db)
            .await,
        "verification_token_by_token",
    )
}

pub async fn get_password_reset_token_by_token<C: ConnectionTrait>(
    db: &C,
    token: &str,
) -> Option<password_reset_token::Model> {
    found(
        password_reset_token::Entity::find()
            .filter(password_reset_token::Column::Token.eq(token))
            .one(db)
            .await,
        "password_reset_token_by_token",
    )
}

pub async fn get_password_reset_token_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Option<password_reset_token::Model> {
    found(
        password_reset_token::Entity::find()
            .filter(password_reset_token::Column::Email.eq(email))
            .one(db)
            .await,
        "password_reset_token_by_email",
    )
}

pub async fn get_two_factor_token_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Option<two_factor_token::Model> {
    found(
        two_factor_token::Entity::find()
            .filter(two_factor_token::Column::Email.eq(email))
            .one(db)
            .await,
        "two_factor_token_by_email",
    )
}
