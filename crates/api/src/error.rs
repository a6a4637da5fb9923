use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use promptcademy_coach::CoachError;
use promptcademy_core::error::CoreError;
use promptcademy_db::store::StoreError;
use serde_json::json;

/// Message shown for every failure whose details stay in the logs.
const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Postgres SQLSTATE for a unique violation.
const UNIQUE_VIOLATION: &str = "23505";

/// Everything a handler can fail with. Rendered as
/// `{ "ok": false, "error": <message>, "code": <CODE> }`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The chat-completion provider failed or could not be reached.
    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => AppError::Core(core),
            StoreError::Database(db) => AppError::Database(db),
        }
    }
}

impl From<CoachError> for AppError {
    fn from(err: CoachError) -> Self {
        match err {
            CoachError::NotConfigured => AppError::Core(CoreError::Configuration(
                "AI is not configured. Set OPENAI_API_KEY on the server.".into(),
            )),
            CoachError::Invalid(core) => AppError::Core(core),
            other => AppError::Upstream(other.to_string()),
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        INTERNAL_MESSAGE.to_string(),
    )
}

impl AppError {
    /// Status, machine-readable code and the message safe to show a client.
    /// Server-side failures are logged here.
    pub fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Core(core) => core_parts(core),
            AppError::Database(err) => classify_sqlx_error(err),
            AppError::Upstream(msg) => {
                tracing::error!(error = %msg, "AI provider request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "UPSTREAM_ERROR",
                    "The AI provider request failed".to_string(),
                )
            }
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        }
    }
}

fn core_parts(err: &CoreError) -> (StatusCode, &'static str, String) {
    match err {
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            format!("{entity} with id {id} not found"),
        ),
        CoreError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
        CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
        CoreError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
        CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
        CoreError::Configuration(msg) => {
            tracing::error!(error = %msg, "Server is misconfigured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIGURATION_ERROR",
                msg.clone(),
            )
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
            internal()
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = self.parts();
        let body = json!({ "ok": false, "error": message, "code": code });
        (status, axum::Json(body)).into_response()
    }
}

/// The only constraint a client can trip is the case-insensitive email index;
/// every other database failure is a 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    if let sqlx::Error::Database(db_err) = err {
        let unique = db_err.code().as_deref() == Some(UNIQUE_VIOLATION);
        if unique && db_err.constraint() == Some("uq_users_email_lower") {
            return (
                StatusCode::CONFLICT,
                "CONFLICT",
                "An account with this email already exists".to_string(),
            );
        }
    }
    tracing::error!(error = %err, "Database error");
    internal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configuration_error_keeps_its_message() {
        let err = AppError::Core(CoreError::Configuration("no active lessons".into()));
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "CONFIGURATION_ERROR");
        assert_eq!(message, "no active lessons");
    }

    #[test]
    fn missing_ai_key_is_a_configuration_error() {
        let (status, code, message) = AppError::from(CoachError::NotConfigured).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "CONFIGURATION_ERROR");
        assert!(message.contains("OPENAI_API_KEY"));
    }

    #[test]
    fn store_errors_unwrap_into_core_variants() {
        let err: AppError = StoreError::Core(CoreError::Conflict("dup".into())).into();
        assert_eq!(err.parts().0, StatusCode::CONFLICT);
    }

    #[test]
    fn database_details_are_not_exposed() {
        let (status, code, message) = AppError::Database(sqlx::Error::PoolTimedOut).parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "INTERNAL_ERROR");
        assert_eq!(message, INTERNAL_MESSAGE);
    }

    #[test]
    fn upstream_details_are_not_exposed() {
        let err: AppError = CoachError::Api {
            status: 401,
            body: "bad key sk-123".into(),
        }
        .into();
        let (status, code, message) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "UPSTREAM_ERROR");
        assert!(!message.contains("sk-123"));
    }
}
