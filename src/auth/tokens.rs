use chrono::{Duration, Utc};
use rand::Rng;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DbErr, EntityTrait, ModelTrait,
    QueryFilter,
};
use uuid::Uuid;

use crate::data::token::{get_password_reset_token_by_email, get_two_factor_token_by_email};
use crate::entities::{password_reset_token, two_factor_token, verification_token};

/// Lifetime of email verification links, in seconds.
pub const VERIFICATION_TOKEN_TTL_SECS: i64 = 3600;
/// Lifetime of password reset links, in seconds.
pub const PASSWORD_RESET_TOKEN_TTL_SECS: i64 = 3600;
/// Lifetime of emailed two-factor codes, in seconds.
pub const TWO_FACTOR_TOKEN_TTL_SECS: i64 = 300;

fn expires_in(secs: i64) -> chrono::DateTime<chrono::FixedOffset> {
    (Utc::now() + Duration::seconds(secs)).fixed_offset()
}

/// Random six-digit code in `100000..=999999`.
#[must_use]
pub fn generate_two_factor_code() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

/// Issue a verification token for `email` on behalf of `user_id`.
///
/// The account's earlier tokens are replaced, so an abandoned email change cannot
/// be confirmed later. So are unbound tokens for `email`. Tokens another account
/// holds for the same address are left alone.
///
/// # Errors
///
/// Returns an error if the old token cannot be deleted or the new one cannot be stored.
pub async fn generate_verification_token<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    email: &str,
) -> Result<verification_token::Model, DbErr> {
    verification_token::Entity::delete_many()
        .filter(
            Condition::any()
                .add(verification_token::Column::UserId.eq(user_id))
                .add(
                    Condition::all()
                        .add(verification_token::Column::Email.eq(email))
                        .add(verification_token::Column::UserId.is_null()),
                ),
        )
        .exec(db)
        .await?;

    verification_token::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(Some(user_id)),
        email: Set(email.to_string()),
        token: Set(Uuid::new_v4().to_string()),
        expires: Set(expires_in(VERIFICATION_TOKEN_TTL_SECS)),
    }
    .insert(db)
    .await
}

/// Issue a password reset token for `email`, replacing any earlier one.
///
/// # Errors
///
/// Returns an error if the old token cannot be deleted or the new one cannot be stored.
pub async fn generate_password_reset_token<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<password_reset_token::Model, DbErr> {
    if let Some(existing) = get_password_reset_token_by_email(db, email).await {
        existing.delete(db).await?;
    }

    password_reset_token::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        token: Set(Uuid::new_v4().to_string()),
        expires: Set(expires_in(PASSWORD_RESET_TOKEN_TTL_SECS)),
    }
    .insert(db)
    .await
}

/// Issue a two-factor code for `email`. Only one code per email is live at a time.
///
/// # Errors
///
/// Returns an error if the old code cannot be deleted or the new one cannot be stored.
pub async fn generate_two_factor_token<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<two_factor_token::Model, DbErr> {
    if let Some(existing) = get_two_factor_token_by_email(db, email).await {
        two_factor_token::Entity::delete_by_id(existing.id)
            .exec(db)
            .await?;
    }

    two_factor_token::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        token: Set(generate_two_factor_code()),
        expires: Set(expires_in(TWO_FACTOR_TOKEN_TTL_SECS)),
    }
    .insert(db)
    .await
}
