use chrono::Utc;
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::Set;
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::{password, tokens};
use crate::data::user::get_user_by_email;
use crate::entities::user;
use crate::error::AppError;
use crate::mail::Email;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RegisterInput {
    pub email: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,
}

/// Create a credentials account and mail its first verification link.
///
/// The account cannot sign in until the link is followed.
///
/// # Errors
///
/// `Invalid fields!`, `Email already in use!`, or `Internal` on storage / mail failure.
pub async fn register(state: &AppState, input: RegisterInput) -> Result<(), AppError> {
    let email = password::normalize_email(input.email.as_deref().unwrap_or_default());
    let name = input.name.as_deref().map(str::trim).unwrap_or_default();
    let supplied_password = input.password.unwrap_or_default();

    let check = password::validate_email(&email)
        .and_then(|()| password::validate_new_password(&supplied_password))
        .and_then(|()| {
            if name.is_empty() {
                Err("Name is required.".to_string())
            } else {
                Ok(())
            }
        });
    if let Err(reason) = check {
        tracing::info!(event = "register_invalid_fields", %reason, "Registration rejected");
        return Err(AppError::invalid_fields());
    }

    if get_user_by_email(&state.db, &email).await.is_some() {
        tracing::info!(event = "register_email_in_use", %email, "Registration rejected");
        return Err(AppError::Conflict("Email already in use!".to_string()));
    }

    let hashed = password::hash_password(&supplied_password)?;
    let now = Utc::now().fixed_offset();

    let new_user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(Some(name.to_string())),
        email: Set(email.clone()),
        email_verified: Set(None),
        image: Set(None),
        password: Set(Some(hashed)),
        role: Set(user::UserRole::User),
        is_two_factor_enabled: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&state.db)
    .await?;

    let token = tokens::generate_verification_token(&state.db, new_user.id, &email).await?;
    state
        .mailer
        .send(Email::verification(
            &token.email,
            &state.config.frontend_url,
            &token.token,
        ))
        .await?;

    tracing::info!(event = "register_success", user_id = %new_user.id, "Account created");
    Ok(())
}
