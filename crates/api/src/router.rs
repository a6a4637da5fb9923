//! The HTTP application: routes plus the middleware every request passes
//! through. `main.rs` and the integration tests both build it here.

use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::routes;
use crate::state::AppState;

const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// How long browsers may cache a CORS preflight answer.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// Margin the request deadline keeps over the coach's upstream timeout, so a
/// hung provider still gets its structured fallback reply.
pub const UPSTREAM_GRACE: Duration = Duration::from_secs(5);

/// Routes wrapped in the middleware stack. Outermost first, a request meets
/// CORS, request-id assignment, tracing, request-id echo, the timeout,
/// gzip and finally panic recovery.
pub fn build_app_router(state: AppState, config: &ServerConfig) -> Router {
    let configured = Duration::from_secs(config.request_timeout_secs);
    let timeout = request_timeout(configured, state.coach.timeout());
    if timeout != configured {
        tracing::warn!(
            configured_secs = config.request_timeout_secs,
            effective_secs = timeout.as_secs(),
            "REQUEST_TIMEOUT_SECS does not outlast the coach timeout, raising it"
        );
    }

    Router::new()
        .merge(routes::health::router())
        .merge(routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(PropagateRequestIdLayer::new(REQUEST_ID))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::new(REQUEST_ID, MakeRequestUuid))
        .layer(build_cors_layer(config))
        .with_state(state)
}

/// The request deadline: `configured`, raised when needed to stay at least
/// [`UPSTREAM_GRACE`] beyond the coach timeout.
pub fn request_timeout(configured: Duration, coach: Option<Duration>) -> Duration {
    match coach {
        Some(coach) => configured.max(coach.saturating_add(UPSTREAM_GRACE)),
        None => configured,
    }
}

/// CORS for the configured front-end origins. Origins that are not valid
/// header values are logged and skipped.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .allow_credentials(true)
        .max_age(PREFLIGHT_MAX_AGE)
}
