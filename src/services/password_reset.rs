//! Forgotten-password flow: mail a reset link, then accept a new password.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ModelTrait, TransactionTrait};
use serde::Deserialize;

use crate::auth::{password, tokens};
use crate::data::token::get_password_reset_token_by_token;
use crate::data::user::get_user_by_email;
use crate::entities::user;
use crate::error::AppError;
use crate::mail::Email;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ResetInput {
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NewPasswordInput {
    pub token: Option<String>,
    pub password: Option<String>,
}

/// Mail a password reset link.
///
/// # Errors
///
/// `Invalid email!`, `Email not found!`, or `Internal`.
pub async fn reset(state: &AppState, input: ResetInput) -> Result<(), AppError> {
    let email = password::normalize_email(input.email.as_deref().unwrap_or_default());
    if password::validate_email(&email).is_err() {
        tracing::info!(event = "reset_invalid_email", "Reset rejected");
        return Err(AppError::BadRequest("Invalid email!".to_string()));
    }

    let Some(existing) = get_user_by_email(&state.db, &email).await else {
        tracing::info!(event = "reset_email_not_found", %email, "Reset rejected");
        return Err(AppError::NotFound("Email not found!".to_string()));
    };

    let token = tokens::generate_password_reset_token(&state.db, &existing.email).await?;
    state
        .mailer
        .send(Email::password_reset(
            &token.email,
            &state.config.frontend_url,
            &token.token,
        ))
        .await?;

    tracing::info!(event = "reset_email_sent", user_id = %existing.id, "Reset email sent");
    Ok(())
}

/// Set a new password with a reset token. The token is single-use.
///
/// # Errors
///
/// `Missing token!`, `Invalid fields!`, `Invalid token!`, `Token has expired!`,
/// `Email does not exist!`, or `Internal`.
pub async fn new_password(state: &AppState, input: NewPasswordInput) -> Result<(), AppError> {
    let Some(token_value) = input.token.filter(|t| !t.is_empty()) else {
        tracing::info!(event = "new_password_missing_token", "New password rejected");
        return Err(AppError::BadRequest("Missing token!".to_string()));
    };

    let supplied = input.password.unwrap_or_default();
    if let Err(reason) = password::validate_new_password(&supplied) {
        tracing::info!(event = "new_password_invalid_fields", %reason, "New password rejected");
        return Err(AppError::invalid_fields());
    }

    let Some(token) = get_password_reset_token_by_token(&state.db, &token_value).await else {
        tracing::info!(event = "new_password_invalid_token", "New password rejected");
        return Err(AppError::BadRequest("Invalid token!".to_string()));
    };

    if token.expires < Utc::now() {
        tracing::info!(event = "new_password_token_expired", email = %token.email, "New password rejected");
        return Err(AppError::BadRequest("Token has expired!".to_string()));
    }

    let Some(existing) = get_user_by_email(&state.db, &token.email).await else {
        tracing::info!(event = "new_password_email_not_found", email = %token.email, "New password rejected");
        return Err(AppError::NotFound("Email does not exist!".to_string()));
    };

    let hashed = password::hash_password(&supplied)?;
    let txn = state.db.begin().await?;

    let user_id = existing.id;
    let mut active: user::ActiveModel = existing.into();
    active.password = Set(Some(hashed));
    active.updated_at = Set(Utc::now().fixed_offset());
    active.update(&txn).await?;

    token.delete(&txn).await?;
    txn.commit().await?;

    tracing::info!(event = "new_password_success", %user_id, "Password updated");
    Ok(())
}
