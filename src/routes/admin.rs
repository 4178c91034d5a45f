use axum::routing::post;
use axum::{Json, Router};

use crate::auth::middleware::AdminUser;
use crate::services::SuccessResponse;
use crate::state::AppState;

/// Build the admin probe route: `/admin`
pub fn router() -> Router<AppState> {
    Router::new().route("/admin", post(admin_action))
}

/// `POST /api/v1/admin`
///
/// Non-admins are turned away by the extractor with `403 Forbidden Server Action!`.
async fn admin_action(AdminUser(admin): AdminUser) -> Json<SuccessResponse> {
    tracing::info!(event = "admin_action", user_id = %admin.id, "Admin action allowed");
    Json(SuccessResponse::new("Allowed Server Action!"))
}
