use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ModelTrait, TransactionTrait};
use serde::Deserialize;

use crate::data::token::get_verification_token_by_token;
use crate::data::user::{get_user_by_email, get_user_by_id};
use crate::entities::user;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct NewVerificationInput {
    pub token: Option<String>,
}

/// Consume a verification token and mark its email as verified.
///
/// The account is found through the token's `user_id` when present, else by the
/// token's email. Its address is set to the token's email, which is how a pending
/// email change from settings takes effect.
///
/// # Errors
///
/// `Token does not exist!`, `Token has expired!`, `Email does not exist!`,
/// `Email already in use!` (the new address was taken in the meantime), or `Internal`.
pub async fn new_verification(
    state: &AppState,
    input: NewVerificationInput,
) -> Result<user::Model, AppError> {
    let token_value = input.token.unwrap_or_default();

    let Some(token) = get_verification_token_by_token(&state.db, &token_value).await else {
        tracing::info!(event = "verification_token_missing", "Verification rejected");
        return Err(AppError::BadRequest("Token does not exist!".to_string()));
    };

    if token.expires < Utc::now() {
        tracing::info!(event = "verification_token_expired", email = %token.email, "Verification rejected");
        return Err(AppError::BadRequest("Token has expired!".to_string()));
    }

    let existing = match token.user_id {
        Some(user_id) => get_user_by_id(&state.db, user_id).await,
        None => get_user_by_email(&state.db, &token.email).await,
    };
    let Some(existing) = existing else {
        tracing::info!(event = "verification_email_not_found", email = %token.email, "Verification rejected");
        return Err(AppError::NotFound("Email does not exist!".to_string()));
    };

    if let Some(owner) = get_user_by_email(&state.db, &token.email).await
        && owner.id != existing.id
    {
        tracing::info!(event = "verification_email_in_use", email = %token.email, "Verification rejected");
        return Err(AppError::Conflict("Email already in use!".to_string()));
    }

    let now = Utc::now().fixed_offset();
    let txn = state.db.begin().await?;

    let mut active: user::ActiveModel = existing.into();
    active.email_verified = Set(Some(now));
    active.email = Set(token.email.clone());
    active.updated_at = Set(now);
    let verified = active.update(&txn).await?;

    token.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!(event = "verification_success", user_id = %verified.id, "Email verified");
    Ok(verified)
}
