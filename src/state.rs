use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::Config;
use crate::mail::Mailer;

/// Shared application state available to all request handlers via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
}
