use assert_matches::assert_matches;
use httpmock::Method::POST;
use httpmock::MockServer;
use promptcademy_coach::{CoachClient, CoachConfig, CoachError};
use promptcademy_core::scoring::{RubricItem, ScoreRequest};
use serde_json::json;

fn client_for(server: &MockServer) -> CoachClient {
    let config = CoachConfig::new("test-key", server.base_url(), "gpt-4o-mini");
    CoachClient::new(Some(config)).unwrap()
}

fn request() -> ScoreRequest {
    ScoreRequest {
        deliverable: Some("Subject: Q3 update\nRevenue grew 12%.".into()),
        rubric: Some(vec![
            RubricItem {
                name: "Clarity".into(),
                max: 50,
            },
            RubricItem {
                name: "Accuracy".into(),
                max: 50,
            },
        ]),
        context: None,
        model: None,
    }
}

fn completion(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn scores_a_well_formed_reply() {
    let server = MockServer::start_async().await;
    let reply = json!({
        "scores": [
            {"name": "Clarity", "score": 45, "reason": "Direct"},
            {"name": "Accuracy", "score": 70, "reason": "Over max"}
        ],
        "total": 85,
        "summary": "Strong draft",
        "actions": ["Add a call to action"]
    });
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("authorization", "Bearer test-key");
            then.status(200).json_body(completion(&reply.to_string()));
        })
        .await;

    let result = client_for(&server).score(&request()).await.unwrap();

    mock.assert_calls(1);
    assert_eq!(result.total, 85);
    assert_eq!(result.xp_awarded, 150);
    assert_eq!(result.scores[1].score, 50);
    assert_eq!(result.actions, vec!["Add a call to action".to_string()]);
}

#[tokio::test]
async fn non_json_reply_degrades_to_neutral_score() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .json_body(completion("Sure! Here is my assessment: pretty good."));
        })
        .await;

    let result = client_for(&server).score(&request()).await.unwrap();

    assert_eq!(result.total, 50);
    assert_eq!(result.scores.len(), 2);
    assert!(result.scores.iter().all(|s| s.score == 25));
}

#[tokio::test]
async fn unreadable_envelope_degrades_to_neutral_score() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).body("<html>gateway</html>");
        })
        .await;

    let result = client_for(&server).score(&request()).await.unwrap();
    assert_eq!(result.total, 50);
}

#[tokio::test]
async fn upstream_error_status_is_reported() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429).body("rate limited");
        })
        .await;

    let err = client_for(&server).score(&request()).await.unwrap_err();
    assert_matches!(err, CoachError::Api { status: 429, .. });
    assert_eq!(err.fallback_result().total, 0);
}

#[tokio::test]
async fn missing_deliverable_fails_before_any_call() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(completion("{}"));
        })
        .await;

    let mut req = request();
    req.deliverable = Some("   ".into());
    let err = client_for(&server).score(&req).await.unwrap_err();

    assert_matches!(err, CoachError::Invalid(_));
    mock.assert_calls(0);
}

#[tokio::test]
async fn unconfigured_client_reports_not_configured() {
    let client = CoachClient::new(None).unwrap();
    assert!(!client.enabled());
    assert_eq!(client.timeout(), None);

    let err = client.score(&request()).await.unwrap_err();
    assert_matches!(err, CoachError::NotConfigured);

    let result = err.fallback_result();
    assert_eq!(result.total, 0);
    assert_eq!(result.xp_awarded, 0);
    assert!(!result.actions.is_empty());
}

#[tokio::test]
async fn unconfigured_client_still_rejects_invalid_requests() {
    let client = CoachClient::new(None).unwrap();

    let err = client.score(&ScoreRequest::default()).await.unwrap_err();
    assert_matches!(err, CoachError::Invalid(_));

    let mut no_rubric = request();
    no_rubric.rubric = None;
    let err = client.score(&no_rubric).await.unwrap_err();
    assert_matches!(err, CoachError::Invalid(_));
}

#[tokio::test]
async fn completion_returns_trimmed_text() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(completion("  Five ad variants...\n"));
        })
        .await;

    let text = client_for(&server)
        .complete("Write ads:\n\nfor a bakery", 300)
        .await
        .unwrap();

    mock.assert_calls(1);
    assert_eq!(text, "Five ad variants...");
}
