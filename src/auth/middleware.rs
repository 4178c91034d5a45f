use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::jwt;
use crate::data::user::get_user_by_id;
use crate::entities::user;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticated user extracted from the `Authorization: Bearer <token>` header.
///
/// The token's subject must still resolve to a stored user row; a missing header,
/// a bad token and a vanished account all answer `401 Unauthorized!`.
/// ```ignore
/// async fn handler(AuthUser(user): AuthUser) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or_else(AppError::unauthorized)?;

        let claims = jwt::validate_access_token(token, &state.config.jwt_secret)
            .map_err(|_| AppError::unauthorized())?;
        let user_id = claims.user_id().map_err(|_| AppError::unauthorized())?;

        let Some(user_model) = get_user_by_id(&state.db, user_id).await else {
            tracing::info!(event = "session_user_missing", %user_id, "Session rejected");
            return Err(AppError::unauthorized());
        };

        Ok(Self(user_model))
    }
}

/// Requires the authenticated user to have the `ADMIN` role.
#[derive(Debug, Clone)]
pub struct AdminUser(pub user::Model);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user_model) = AuthUser::from_request_parts(parts, state).await?;

        if user_model.role != user::UserRole::Admin {
            return Err(AppError::Forbidden("Forbidden Server Action!".to_string()));
        }

        Ok(Self(user_model))
    }
}
