use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// JSON body extractor whose rejection is the form error `Invalid fields!`.
///
/// Plain `Json` answers malformed bodies with a text response; form-style clients
/// expect the usual `{ "error": ... }` shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormJson<T>(pub T);

impl<T, S> FromRequest<S> for FormJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::info!(event = "invalid_body", reason = %rejection.body_text(), "Request body rejected");
                Err(AppError::invalid_fields())
            }
        }
    }
}
