mod admin;
mod auth;
pub mod extract;
mod favorites;
mod health;
mod movies;
mod profiles;
mod users;
mod watch_time;

use axum::Router;

use crate::state::AppState;

/// Build the complete application router.
///
/// Structure:
/// - `GET /health`: lightweight liveness check
/// - `/api/v1/auth/...`: login, registration, verification, password reset, OAuth, sessions
/// - `/api/v1/users/me`, `PATCH /api/v1/settings`: the current account
/// - `/api/v1/profiles/...`, `/api/v1/favorites/...`, `/api/v1/watch-time/...`: per-profile data
/// - `/api/v1/movies/...`: catalogue, writes admin-only
/// - `POST /api/v1/admin`: admin probe
/// - `GET /api/v1/health`: detailed health check with database connectivity
pub fn router() -> Router<AppState> {
    let api_v1 = Router::new()
        .merge(health::api_router())
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .merge(users::settings_router())
        .nest("/profiles", profiles::router())
        .nest("/movies", movies::router())
        .nest("/favorites", favorites::router())
        .nest("/watch-time", watch_time::router())
        .merge(admin::router());

    Router::new()
        .merge(health::root_router())
        .nest("/api/v1", api_v1)
}
