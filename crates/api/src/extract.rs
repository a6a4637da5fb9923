//! Body extractors that answer in the JSON error envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use promptcademy_core::error::CoreError;

use crate::error::AppError;

/// `axum::Json`, except that a body which is not valid JSON for `T` is a
/// 400 `VALIDATION_ERROR` instead of axum's plain-text 4xx.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                tracing::debug!(status = %rejection.status(), "Rejected request body");
                Err(AppError::Core(CoreError::Validation(rejection.body_text())))
            }
        }
    }
}
