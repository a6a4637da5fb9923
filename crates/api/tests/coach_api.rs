//! HTTP-level tests for the AI coach scoring endpoint.

mod common;

use axum::http::StatusCode;
use std::time::Duration;

use common::{
    body_json, build_test_app_with, build_test_app_with_config, get_auth, mock_coach, post_json,
    post_json_auth, seeded_store, signup, test_config,
};
use httpmock::Method::POST;
use httpmock::MockServer;
use promptcademy_coach::{CoachClient, CoachConfig};
use serde_json::{json, Value};

fn score_body() -> Value {
    json!({
        "deliverable": "Subject: Q3 update\nRevenue grew 12% on stronger renewals.",
        "rubric": [
            { "name": "Clarity", "max": 50 },
            { "name": "Accuracy", "max": 50 }
        ],
        "context": { "lesson": "Email: Executive Update" }
    })
}

fn completion(content: &str) -> Value {
    json!({
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn missing_credential_returns_fallback_score() {
    let app = common::build_test_app().await;

    let response = post_json(app, "/api/coach/score", score_body()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["code"], "CONFIGURATION_ERROR");
    assert_eq!(json["total"], 0);
    assert_eq!(json["xpAwarded"], 0);
    assert_eq!(json["scores"], json!([]));
    assert!(!json["actions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_body_is_400_even_without_credential() {
    let app = common::build_test_app().await;

    let response = post_json(app, "/api/coach/score", json!({})).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Missing deliverable");
}

#[tokio::test]
async fn fractional_rubric_max_is_accepted() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .json_body(completion(r#"{"scores":[{"name":"Tone","score":20}]}"#));
        })
        .await;
    let app = build_test_app_with(seeded_store().await, mock_coach(&server.base_url()));

    let response = post_json(
        app,
        "/api/coach/score",
        json!({ "deliverable": "Buy now!", "rubric": [{ "name": "Tone", "max": 12.5 }] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["scores"][0]["score"], 13);
    assert_eq!(json["total"], 13);
    mock.assert_calls(1);
}

#[tokio::test]
async fn invalid_request_is_400_without_upstream_call() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(completion("{}"));
        })
        .await;
    let app = build_test_app_with(seeded_store().await, mock_coach(&server.base_url()));

    let response = post_json(
        app,
        "/api/coach/score",
        json!({ "deliverable": "   ", "rubric": [{ "name": "Clarity", "max": 10 }] }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["error"], "Missing deliverable");
    mock.assert_calls(0);
}

#[tokio::test]
async fn scored_reply_credits_signed_in_learner() {
    let server = MockServer::start_async().await;
    let reply = json!({
        "scores": [
            { "name": "Clarity", "score": 44, "reason": "Direct and short" },
            { "name": "Accuracy", "score": 42, "reason": "Figures check out" }
        ],
        "total": 86,
        "summary": "Ready to send",
        "actions": ["Lead with the headline number"]
    });
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200).json_body(completion(&reply.to_string()));
        })
        .await;

    let app = build_test_app_with(seeded_store().await, mock_coach(&server.base_url()));
    let (token, _) = signup(app.clone(), "learner@example.com").await;

    let response = post_json_auth(app.clone(), "/api/coach/score", score_body(), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["ok"], true);
    assert_eq!(json["total"], 86);
    assert_eq!(json["xpAwarded"], 150);
    assert_eq!(json["scores"].as_array().unwrap().len(), 2);
    mock.assert_calls(1);

    let stats = body_json(get_auth(app, "/me/stats", &token).await).await;
    assert_eq!(stats["stats"]["xp"], 150);
    let badges = stats["badges"].as_array().unwrap();
    assert_eq!(badges.len(), 1);
    assert_eq!(badges[0]["badgeId"], "high-scorer");
}

#[tokio::test]
async fn unreadable_reply_scores_neutral_for_anonymous_caller() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .json_body(completion("I'd rate this around seventy."));
        })
        .await;
    let app = build_test_app_with(seeded_store().await, mock_coach(&server.base_url()));

    let response = post_json(app, "/api/coach/score", score_body()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["total"], 50);
    assert_eq!(json["scores"][0]["score"], 25);
}

#[tokio::test]
async fn upstream_failure_returns_fallback_score() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(500).body("upstream exploded");
        })
        .await;
    let app = build_test_app_with(seeded_store().await, mock_coach(&server.base_url()));

    let response = post_json(app, "/api/coach/score", score_body()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert_eq!(json["total"], 0);
    assert_eq!(json["xpAwarded"], 0);
    assert!(!json["error"].as_str().unwrap().contains("exploded"));
}

#[tokio::test]
async fn hung_upstream_gets_fallback_before_request_deadline() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .delay(Duration::from_secs(3))
                .json_body(completion("{}"));
        })
        .await;
    let coach = CoachClient::new(Some(
        CoachConfig::new("test-key", server.base_url(), "gpt-4o-mini")
            .with_timeout(Duration::from_secs(1)),
    ))
    .unwrap();
    let mut config = test_config();
    config.request_timeout_secs = 1;
    let app = build_test_app_with_config(seeded_store().await, coach, config);

    let response = post_json(app, "/api/coach/score", score_body()).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["ok"], false);
    assert_eq!(json["code"], "UPSTREAM_ERROR");
    assert_eq!(json["total"], 0);
    assert_eq!(json["xpAwarded"], 0);
}
