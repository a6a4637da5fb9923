//! Shared response envelope for API handlers.
//!
//! Successful responses are `{ "ok": true, ...fields }`; failures are
//! produced by [`crate::error::AppError`] as `{ "ok": false, "error", "code" }`.

use serde::Serialize;

/// `{ "ok": true, ... }` envelope with the payload's fields flattened in.
///
/// ```ignore
/// Ok(Json(OkResponse::new(LessonBody { lesson })))
/// ```
#[derive(Debug, Serialize)]
pub struct OkResponse<T: Serialize> {
    pub ok: bool,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> OkResponse<T> {
    pub fn new(body: T) -> Self {
        Self { ok: true, body }
    }
}
