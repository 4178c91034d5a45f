//! Sign-in through a linked Google or GitHub identity.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{ActiveModelTrait, TransactionTrait};
use uuid::Uuid;

use crate::auth::oauth::OAuthProfile;
use crate::auth::password;
use crate::auth::session::{self, Session};
use crate::data::account::get_account_by_provider;
use crate::data::user::{get_user_by_email, get_user_by_id};
use crate::entities::{account, user};
use crate::error::AppError;
use crate::state::AppState;

/// Find the account linked to `profile`, or provision a new one, and open a session.
///
/// Provider identities count as verified, so new users get `email_verified` set and
/// no password. The two-factor gate applies to credential login only.
///
/// # Errors
///
/// `Email already in use with different provider!` when the address belongs to a
/// user without a link to this provider, or `Internal`.
pub async fn sign_in_with_oauth(
    state: &AppState,
    profile: OAuthProfile,
) -> Result<Session, AppError> {
    let provider = profile.provider.as_str();

    let linked = match get_account_by_provider(&state.db, provider, &profile.provider_account_id)
        .await
    {
        Some(link) => get_user_by_id(&state.db, link.user_id).await,
        None => None,
    };

    let user_model = if let Some(existing) = linked {
        tracing::info!(event = "oauth_signin_existing", user_id = %existing.id, provider, "OAuth sign-in");
        existing
    } else {
        let email = password::normalize_email(&profile.email);
        if let Some(owner) = get_user_by_email(&state.db, &email).await {
            tracing::info!(event = "oauth_email_in_use", user_id = %owner.id, provider, "OAuth sign-in rejected");
            return Err(AppError::Conflict(
                "Email already in use with different provider!".to_string(),
            ));
        }
        let created = create_oauth_user(state, &profile, &email).await?;
        tracing::info!(event = "oauth_user_created", user_id = %created.id, provider, "OAuth account provisioned");
        created
    };

    let tokens = session::issue_tokens(&state.db, &state.config, &user_model).await?;
    Ok(Session {
        user: user_model,
        tokens,
    })
}

async fn create_oauth_user(
    state: &AppState,
    profile: &OAuthProfile,
    email: &str,
) -> Result<user::Model, AppError> {
    let now = Utc::now().fixed_offset();
    let txn = state.db.begin().await?;

    let created = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(profile.name.clone()),
        email: Set(email.to_string()),
        email_verified: Set(Some(now)),
        image: Set(profile.image.clone()),
        password: Set(None),
        role: Set(user::UserRole::User),
        is_two_factor_enabled: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&txn)
    .await?;

    account::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(created.id),
        provider: Set(profile.provider.as_str().to_string()),
        provider_account_id: Set(profile.provider_account_id.clone()),
        created_at: Set(now),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;
    Ok(created)
}
