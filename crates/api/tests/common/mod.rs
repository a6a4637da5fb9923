#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use promptcademy_api::auth::jwt::JwtConfig;
use promptcademy_api::config::ServerConfig;
use promptcademy_api::router::build_app_router;
use promptcademy_api::state::AppState;
use promptcademy_coach::{CoachClient, CoachConfig};
use promptcademy_db::memory::MemoryStore;
use promptcademy_db::seed::seed_starter_lessons;
use serde_json::Value;
use tower::ServiceExt;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const PASSWORD: &str = "correct-horse";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        database_url: None,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            expiry_mins: 60,
        },
        lesson_utc_offset_minutes: -300,
        seed_on_boot: false,
        admin_email: Some(ADMIN_EMAIL.to_string()),
    }
}

/// Coach pointed at a mock server.
pub fn mock_coach(base_url: &str) -> CoachClient {
    CoachClient::new(Some(CoachConfig::new("test-key", base_url, "gpt-4o-mini"))).unwrap()
}

/// Coach with no API key.
pub fn disabled_coach() -> CoachClient {
    CoachClient::new(None).unwrap()
}

/// Build the full application router over `store`, with the production
/// middleware stack.
pub fn build_test_app_with(store: Arc<MemoryStore>, coach: CoachClient) -> Router {
    build_test_app_with_config(store, coach, test_config())
}

pub fn build_test_app_with_config(
    store: Arc<MemoryStore>,
    coach: CoachClient,
    config: ServerConfig,
) -> Router {
    let state = AppState::new(store, config.clone(), coach).unwrap();
    build_app_router(state, &config)
}

/// App over a store seeded with the four starter lessons, coach disabled.
pub async fn build_test_app() -> Router {
    let store = seeded_store().await;
    build_test_app_with(store, disabled_coach())
}

pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    seed_starter_lessons(store.as_ref()).await.unwrap();
    store
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

/// POST a raw body labelled as JSON, for bodies that are not valid JSON.
pub async fn post_raw(app: Router, uri: &str, body: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn put_json_auth(app: Router, uri: &str, body: Value, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Sign up through the API and return `(token, user_id)`.
pub async fn signup(app: Router, email: &str) -> (String, i64) {
    let body = serde_json::json!({ "name": "Test User", "email": email, "password": PASSWORD });
    let response = post_json(app, "/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    (
        json["token"].as_str().unwrap().to_string(),
        json["user"]["id"].as_i64().unwrap(),
    )
}
