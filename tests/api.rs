//! API endpoint integration tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use tower::ServiceExt;

mod common;
use common::{ScriptedChat, test_assistant, test_router, test_state};

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = test_router(test_state(None));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
}

#[tokio::test]
async fn ready_reports_collaborator_availability() {
    let app = test_router(test_state(None));

    let response = app
        .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
        .await
        .unwrap();

    // Missing collaborators degrade features but the gateway stays ready.
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["checks"]["catalog"]["status"], "ok");
    assert_eq!(json["checks"]["chat"]["status"], "unavailable");
    assert_eq!(json["checks"]["stt"]["status"], "unavailable");
}

#[tokio::test]
async fn status_includes_restaurant_name() {
    let app = test_router(test_state(None));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["restaurant"], "Test Bistro");
    assert_eq!(json["voice_available"], false);
}

#[tokio::test]
async fn menu_snapshot_returns_the_catalog() {
    let app = test_router(test_state(None));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/menu")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["restaurant"]["name"], "Test Bistro");
    assert_eq!(json["menu"]["pizzas"].as_array().unwrap().len(), 2);
    // camelCase wire names
    assert_eq!(json["menu"]["pizzas"][0]["cheeseRemovable"], true);
}

#[tokio::test]
async fn visible_endpoint_applies_query_filters() {
    let app = test_router(test_state(None));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/menu/visible?vegetarian=true")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["category"], "all");
    assert_eq!(json["count"], 2);
    assert_eq!(json["items"][0]["id"], 1);
    assert_eq!(json["items"][1]["id"], 3);
}

#[tokio::test]
async fn visible_endpoint_accepts_unknown_categories() {
    let app = test_router(test_state(None));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/menu/visible?category=sushis")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["count"], 0);
}

#[tokio::test]
async fn session_lifecycle_create_then_read() {
    let app = test_router(test_state(None));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["state"]["category"], "all");
    assert_eq!(created["state"]["filters"]["vegetarian"], false);
    assert_eq!(created["visible"].as_array().unwrap().len(), 4);

    let id = created["sessionId"].as_str().unwrap();
    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/api/sessions/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["sessionId"], created["sessionId"]);
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = test_router(test_state(None));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/sessions/00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "session_not_found");
}

#[tokio::test]
async fn turn_without_chat_key_is_unavailable() {
    let app = test_router(test_state(None));

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let id = body_json(response).await["sessionId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/sessions/{id}/turns"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"text":"bonjour"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "chat_unavailable");
}

#[tokio::test]
async fn turn_applies_action_and_returns_state_patch() {
    let raw = r#"{"response":"Voici nos plats végétariens","actions":{"filters":{"vegetarian":true}}}"#;
    let state = test_state(Some(test_assistant(ScriptedChat::replying(raw))));
    let app = test_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let id = body_json(response).await["sessionId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/sessions/{id}/turns"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"text":"je suis végétarien"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["reply"], "Voici nos plats végétariens");
    assert_eq!(json["actionApplied"], true);
    assert_eq!(json["noSpeech"], false);
    assert_eq!(json["state"]["filters"]["vegetarian"], true);
    assert_eq!(json["visible"].as_array().unwrap().len(), 2);
    assert!(json["error"].is_null());
}

#[tokio::test]
async fn empty_turn_is_reported_as_no_speech() {
    let state = test_state(Some(test_assistant(ScriptedChat::replying("unused"))));
    let app = test_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let id = body_json(response).await["sessionId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/sessions/{id}/turns"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"text":"   "}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["noSpeech"], true);
    assert!(json["reply"].is_null());
    assert_eq!(json["state"]["category"], "all");
}

#[tokio::test]
async fn upstream_failure_keeps_session_state() {
    let state = test_state(Some(test_assistant(ScriptedChat::failing("boom"))));
    let app = test_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/sessions")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let id = body_json(response).await["sessionId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(format!("/api/sessions/{id}/turns"))
                .header("content-type", "application/json")
                .body(Body::from(r#"{"text":"bonjour"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["reply"].is_null());
    assert!(json["error"].as_str().unwrap().contains("boom"));
    assert_eq!(json["state"]["category"], "all");
    assert_eq!(json["state"]["filters"]["vegetarian"], false);
}

#[tokio::test]
async fn transcribe_without_stt_is_unavailable() {
    let app = test_router(test_state(None));

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/voice/transcribe")
                .body(Body::from(vec![0_u8; 16]))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "not_configured");
}

#[tokio::test]
async fn voice_capabilities_reflect_configuration() {
    let app = test_router(test_state(None));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/voice/capabilities")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["stt_available"], false);
}
