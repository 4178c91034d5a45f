//! Session issuance.
//!
//! A session is a JWT access token plus a tracked refresh token. The credential
//! sign-in here is the last gate of the login flow: it re-checks the password and
//! the account state, consumes the two-factor confirmation, then issues tokens.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, ConnectionTrait, DatabaseConnection, ModelTrait};
use uuid::Uuid;

use crate::auth::{jwt, password};
use crate::config::Config;
use crate::data::two_factor_confirmation::get_two_factor_confirmation_by_user_id;
use crate::data::user::get_user_by_email;
use crate::entities::{refresh_token, user};

/// A signed-in user and their fresh token pair.
#[derive(Debug)]
pub struct Session {
    pub user: user::Model,
    pub tokens: jwt::TokenPair,
}

/// Why a credential sign-in was refused.
#[derive(Debug)]
pub enum SignInError {
    /// Unknown email, no password on file, or wrong password.
    CredentialsSignin,
    /// Credentials were fine but the account may not sign in yet.
    AccessDenied,
    /// Anything unexpected (database, token encoding).
    Internal(anyhow::Error),
}

impl SignInError {
    /// Stable error type name, as reported to logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::CredentialsSignin => "CredentialsSignin",
            Self::AccessDenied => "AccessDenied",
            Self::Internal(_) => "Internal",
        }
    }
}

impl<E> From<E> for SignInError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::Internal(err.into())
    }
}

/// Sign in with email and password.
///
/// Unverified accounts are refused, and so are two-factor accounts without a
/// confirmation row. The confirmation is deleted here, so each successful second
/// factor covers exactly one sign-in.
///
/// # Errors
///
/// See [`SignInError`].
pub async fn sign_in_with_credentials(
    db: &DatabaseConnection,
    config: &Config,
    email: &str,
    supplied_password: &str,
) -> Result<Session, SignInError> {
    let user_model = get_user_by_email(db, email)
        .await
        .ok_or(SignInError::CredentialsSignin)?;
    let hash = user_model
        .password
        .as_deref()
        .ok_or(SignInError::CredentialsSignin)?;
    if !password::verify_password(supplied_password, hash)? {
        return Err(SignInError::CredentialsSignin);
    }

    if user_model.email_verified.is_none() {
        return Err(SignInError::AccessDenied);
    }

    if user_model.is_two_factor_enabled {
        let confirmation = get_two_factor_confirmation_by_user_id(db, user_model.id)
            .await
            .ok_or(SignInError::AccessDenied)?;
        confirmation.delete(db).await?;
    }

    let tokens = issue_tokens(db, config, &user_model).await?;
    Ok(Session {
        user: user_model,
        tokens,
    })
}

/// Generate a token pair for `user_model` and record its refresh token.
///
/// # Errors
///
/// Returns an error if token encoding or the insert fails.
pub async fn issue_tokens<C: ConnectionTrait>(
    db: &C,
    config: &Config,
    user_model: &user::Model,
) -> anyhow::Result<jwt::TokenPair> {
    let pair = jwt::generate_token_pair(user_model.id, user_model.role, config)?;
    store_refresh_token(db, user_model.id, &pair).await?;
    Ok(pair)
}

async fn store_refresh_token<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    pair: &jwt::TokenPair,
) -> anyhow::Result<()> {
    refresh_token::ActiveModel {
        id: Set(pair.refresh_jti),
        user_id: Set(user_id),
        expires_at: Set(pair.refresh_expires_at.fixed_offset()),
        revoked_at: Set(None),
        created_at: Set(Utc::now().fixed_offset()),
    }
    .insert(db)
    .await?;
    Ok(())
}
