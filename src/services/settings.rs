//! Account settings update for the signed-in user.

use chrono::Utc;
use sea_orm::ActiveModelTrait;
use sea_orm::ActiveValue::Set;
use serde::Deserialize;

use crate::auth::{password, tokens};
use crate::data::account::get_account_by_user_id;
use crate::data::user::{get_user_by_email, get_user_by_id};
use crate::entities::user;
use crate::error::AppError;
use crate::mail::Email;
use crate::state::AppState;

/// Partial settings record. Absent fields are left unchanged.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub new_password: Option<String>,
    pub role: Option<user::UserRole>,
    pub is_two_factor_enabled: Option<bool>,
}

#[derive(Debug)]
pub enum SettingsOutcome {
    /// The email is changing; a link was mailed to the new address and nothing was saved.
    VerificationSent,
    Updated(user::Model),
}

impl SettingsInput {
    fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.name
            && name.trim().is_empty()
        {
            return Err("Name must not be empty.".to_string());
        }
        if let Some(email) = &self.email {
            password::validate_email(&password::normalize_email(email))?;
        }
        match (&self.password, &self.new_password) {
            (Some(_), None) => Err("New password is required.".to_string()),
            (None, Some(_)) => Err("Password is required.".to_string()),
            (Some(current), Some(new)) => {
                if current.is_empty() {
                    return Err("Password is required.".to_string());
                }
                password::validate_new_password(new)
            }
            (None, None) => Ok(()),
        }
    }

    /// OAuth accounts cannot change these locally.
    fn strip_credentials(&mut self) {
        self.email = None;
        self.password = None;
        self.new_password = None;
        self.is_two_factor_enabled = None;
    }
}

/// Apply a settings change for `user_id`.
///
/// # Errors
///
/// `Unauthorized!` when the account no longer exists, `Invalid fields!`,
/// `Email allready in use!`, `Incorrect password!`, or `Internal`.
pub async fn update_settings(
    state: &AppState,
    user_id: uuid::Uuid,
    mut input: SettingsInput,
) -> Result<SettingsOutcome, AppError> {
    let Some(db_user) = get_user_by_id(&state.db, user_id).await else {
        tracing::info!(event = "settings_unauthorized", %user_id, "Settings rejected");
        return Err(AppError::unauthorized());
    };

    // Credential fields are dropped before validation, so OAuth accounts never fail on them.
    if get_account_by_user_id(&state.db, db_user.id).await.is_some() {
        input.strip_credentials();
    }

    if let Err(reason) = input.validate() {
        tracing::info!(event = "settings_invalid_fields", %reason, "Settings rejected");
        return Err(AppError::invalid_fields());
    }

    if let Some(email) = input.email.as_deref().map(password::normalize_email)
        && email != db_user.email
    {
        if let Some(owner) = get_user_by_email(&state.db, &email).await
            && owner.id != db_user.id
        {
            tracing::info!(event = "settings_email_in_use", user_id = %db_user.id, "Settings rejected");
            return Err(AppError::Conflict("Email allready in use!".to_string()));
        }

        let token = tokens::generate_verification_token(&state.db, db_user.id, &email).await?;
        state
            .mailer
            .send(Email::verification(
                &token.email,
                &state.config.frontend_url,
                &token.token,
            ))
            .await?;
        tracing::info!(event = "settings_verification_sent", user_id = %db_user.id, "Email change pending verification");
        return Ok(SettingsOutcome::VerificationSent);
    }

    let mut new_hash = None;
    if let (Some(current), Some(new)) = (&input.password, &input.new_password) {
        let matches = match db_user.password.as_deref() {
            Some(hash) => password::verify_password(current, hash)?,
            None => false,
        };
        if !matches {
            tracing::info!(event = "settings_incorrect_password", user_id = %db_user.id, "Settings rejected");
            return Err(AppError::BadRequest("Incorrect password!".to_string()));
        }
        new_hash = Some(password::hash_password(new)?);
    }

    let mut active: user::ActiveModel = db_user.into();
    if let Some(name) = input.name {
        active.name = Set(Some(name.trim().to_string()));
    }
    if let Some(role) = input.role {
        active.role = Set(role);
    }
    if let Some(enabled) = input.is_two_factor_enabled {
        active.is_two_factor_enabled = Set(enabled);
    }
    if let Some(hash) = new_hash {
        active.password = Set(Some(hash));
    }
    active.updated_at = Set(Utc::now().fixed_offset());
    let updated = active.update(&state.db).await?;

    tracing::info!(event = "settings_updated", user_id = %updated.id, "Settings updated");
    Ok(SettingsOutcome::Updated(updated))
}
