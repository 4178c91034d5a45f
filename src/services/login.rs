//! Credential login: shape check, account lookup, email-verification gate,
//! two-factor gate, then credential sign-in.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    TransactionTrait,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::session::{self, Session, SignInError};
use crate::auth::{password, tokens};
use crate::data::token::get_two_factor_token_by_email;
use crate::data::user::get_user_by_email;
use crate::entities::{two_factor_confirmation, two_factor_token, user};
use crate::error::{AppError, SOMETHING_WENT_WRONG};
use crate::mail::Email;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
    /// Two-factor code from the email, on the second submission.
    pub code: Option<String>,
}

/// Result of a login attempt that did not fail.
#[derive(Debug)]
pub enum LoginOutcome {
    /// Email not verified yet; a fresh confirmation link was mailed.
    ConfirmationSent,
    /// A two-factor code was mailed; the client must resubmit with `code`.
    TwoFactorRequired,
    SignedIn(Session),
}

struct LoginFields {
    email: String,
    password: String,
    code: Option<String>,
}

impl TryFrom<LoginInput> for LoginFields {
    type Error = String;

    fn try_from(input: LoginInput) -> Result<Self, Self::Error> {
        let email = password::normalize_email(input.email.as_deref().unwrap_or_default());
        password::validate_email(&email)?;
        let password = input
            .password
            .filter(|p| !p.is_empty())
            .ok_or_else(|| "Password is required.".to_string())?;
        let code = input
            .code
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty());
        Ok(Self {
            email,
            password,
            code,
        })
    }
}

/// Run the login flow.
///
/// # Errors
///
/// - `Invalid fields!` for a malformed email or empty password (no I/O happens)
/// - `Email does not exist!` for unknown emails and OAuth-only accounts
/// - `Invalid code!` / `Code has expired!` for a bad two-factor code
/// - `Invalid credentials!` when the password does not match
/// - `Something went wrong!` when sign-in is refused for another reason
/// - `Internal` for unexpected database or mail failures
pub async fn login(state: &AppState, input: LoginInput) -> Result<LoginOutcome, AppError> {
    let fields = LoginFields::try_from(input).map_err(|reason| {
        tracing::info!(event = "login_invalid_fields", %reason, "Login rejected");
        AppError::invalid_fields()
    })?;

    let Some(user_model) = get_user_by_email(&state.db, &fields.email)
        .await
        .filter(|u| u.password.is_some())
    else {
        tracing::info!(event = "login_email_not_found", email = %fields.email, "Login rejected");
        return Err(AppError::NotFound("Email does not exist!".to_string()));
    };

    if user_model.email_verified.is_none() {
        let token = tokens::generate_verification_token(&state.db, user_model.id, &user_model.email)
            .await?;
        state
            .mailer
            .send(Email::verification(
                &token.email,
                &state.config.frontend_url,
                &token.token,
            ))
            .await?;
        tracing::info!(event = "login_confirmation_sent", user_id = %user_model.id, "Email not verified");
        return Ok(LoginOutcome::ConfirmationSent);
    }

    if user_model.is_two_factor_enabled {
        let Some(code) = fields.code.as_deref() else {
            let token = tokens::generate_two_factor_token(&state.db, &user_model.email).await?;
            state
                .mailer
                .send(Email::two_factor_code(&token.email, &token.token))
                .await?;
            tracing::info!(event = "login_two_factor_sent", user_id = %user_model.id, "Two-factor code sent");
            return Ok(LoginOutcome::TwoFactorRequired);
        };

        confirm_two_factor(&state.db, &user_model, code).await?;
    }

    match session::sign_in_with_credentials(
        &state.db,
        &state.config,
        &user_model.email,
        &fields.password,
    )
    .await
    {
        Ok(session) => {
            tracing::info!(event = "login_success", user_id = %session.user.id, "User signed in");
            Ok(LoginOutcome::SignedIn(session))
        }
        Err(SignInError::CredentialsSignin) => {
            tracing::info!(event = "login_invalid_credentials", user_id = %user_model.id, "Login rejected");
            Err(AppError::Unauthorized("Invalid credentials!".to_string()))
        }
        Err(SignInError::Internal(err)) => Err(AppError::Internal(err)),
        Err(other) => {
            tracing::warn!(
                event = "login_sign_in_refused",
                user_id = %user_model.id,
                kind = other.kind(),
                "Sign-in refused"
            );
            Err(AppError::Forbidden(SOMETHING_WENT_WRONG.to_string()))
        }
    }
}

/// Check `code` against the stored two-factor token and record the confirmation.
///
/// Deleting the token and replacing the confirmation happen in one transaction,
/// so a failure part-way leaves the previous state untouched.
async fn confirm_two_factor(
    db: &DatabaseConnection,
    user_model: &user::Model,
    code: &str,
) -> Result<(), AppError> {
    let Some(token) = get_two_factor_token_by_email(db, &user_model.email)
        .await
        .filter(|t| t.token == code)
    else {
        tracing::info!(event = "login_invalid_code", user_id = %user_model.id, "Two-factor code rejected");
        return Err(AppError::Unauthorized("Invalid code!".to_string()));
    };

    if token.expires < Utc::now() {
        tracing::info!(event = "login_code_expired", user_id = %user_model.id, "Two-factor code rejected");
        return Err(AppError::Unauthorized("Code has expired!".to_string()));
    }

    let txn = db.begin().await?;

    two_factor_token::Entity::delete_by_id(token.id)
        .exec(&txn)
        .await?;
    two_factor_confirmation::Entity::delete_many()
        .filter(two_factor_confirmation::Column::UserId.eq(user_model.id))
        .exec(&txn)
        .await?;
    two_factor_confirmation::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_model.id),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    tracing::info!(event = "login_two_factor_confirmed", user_id = %user_model.id, "Two-factor code accepted");
    Ok(())
}
