//! The server actions behind each endpoint.
//!
//! Every action takes the shared [`AppState`](crate::state::AppState) and a raw
//! input record, returns early on the first failed check, and emits one
//! structured `event` per branch.

pub mod favorites;
pub mod login;
pub mod movies;
pub mod oauth;
pub mod password_reset;
pub mod profiles;
pub mod register;
pub mod settings;
pub mod verification;
pub mod watch_time;

use serde::Serialize;
use uuid::Uuid;

use crate::entities::user;

/// `{ "success": "<message>" }`
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: String,
}

impl SuccessResponse {
    #[must_use]
    pub fn new(message: &str) -> Self {
        Self {
            success: message.to_string(),
        }
    }
}

/// Public view of a user account.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: Option<String>,
    pub email: String,
    pub email_verified: Option<String>,
    pub image: Option<String>,
    pub role: user::UserRole,
    pub is_two_factor_enabled: bool,
    #[serde(rename = "isOAuth")]
    pub is_oauth: bool,
    pub created_at: String,
}

impl UserResponse {
    #[must_use]
    pub fn new(u: &user::Model, is_oauth: bool) -> Self {
        Self {
            id: u.id,
            name: u.name.clone(),
            email: u.email.clone(),
            email_verified: u.email_verified.map(|t| t.to_rfc3339()),
            image: u.image.clone(),
            role: u.role,
            is_two_factor_enabled: u.is_two_factor_enabled,
            is_oauth,
            created_at: u.created_at.to_rfc3339(),
        }
    }
}
