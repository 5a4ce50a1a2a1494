/// Message store and action HTTP tests
///
/// Covers the operational surface: manual saves, phone filtering, clearing,
/// and batch actions routed to a recording outbound API.
/// Run with: cargo test --test store_actions_http_tests

use async_trait::async_trait;
use axum::{
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower::ServiceExt;
use wcrm_bridge::{
    AppState, BridgeError, OutboundMessage, TemplateMessage, WcrmApi, WebhookSettings,
    build_router,
};

#[derive(Default)]
struct RecordingApi {
    requests: Mutex<Vec<Value>>,
    fail_with: Option<String>,
}

#[async_trait]
impl WcrmApi for RecordingApi {
    async fn send_message(&self, message: &OutboundMessage) -> wcrm_bridge::Result<Value> {
        if let Some(reason) = &self.fail_with {
            return Err(BridgeError::Upstream(reason.clone()));
        }
        self.requests.lock().await.push(message.to_request_body());
        Ok(json!({"success": true, "to": message.to}))
    }

    async fn send_template(&self, template: &TemplateMessage) -> wcrm_bridge::Result<Value> {
        self.requests.lock().await.push(template.to_request_body());
        Ok(json!({"success": true}))
    }

    async fn verify_credentials(&self) -> wcrm_bridge::Result<()> {
        Ok(())
    }
}

fn app_with_settings(settings: WebhookSettings) -> axum::Router {
    build_router(AppState::build(settings, None))
}

fn app_with_api(api: Option<Arc<dyn WcrmApi>>) -> axum::Router {
    build_router(AppState::build(WebhookSettings::default(), api))
}

fn app() -> axum::Router {
    app_with_api(None)
}

async fn send(app: &axum::Router, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    if body.is_empty() {
        return (status, Value::Null);
    }

    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, json)
}

async fn send_json(app: &axum::Router, method: Method, uri: &str, payload: Value) -> (StatusCode, Value) {
    send(app, method, uri, Body::from(payload.to_string())).await
}

async fn send_empty(app: &axum::Router, method: Method, uri: &str) -> (StatusCode, Value) {
    send(app, method, uri, Body::empty()).await
}

#[tokio::test]
async fn test_save_list_and_clear_messages() {
    let app = app();

    let (status, saved) = send_json(
        &app,
        Method::POST,
        "/scopes/s1/messages",
        json!({"from": "+1", "text": {"body": "manual"}}),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved["success"], true);
    assert_eq!(saved["message"], "Message saved successfully");
    assert!(saved["stored"]["savedAt"].is_string());
    assert!(saved["stored"].get("receivedAt").is_none());

    send_json(&app, Method::POST, "/scopes/s1/messages", json!({"from": "+2"})).await;

    let (_, all) = send_empty(&app, Method::GET, "/scopes/s1/messages").await;
    assert_eq!(all["success"], true);
    assert_eq!(all["count"], 2);
    assert!(all.get("phone").is_none());

    let (_, filtered) = send_empty(&app, Method::GET, "/scopes/s1/messages?phone=%2B2").await;
    assert_eq!(filtered["count"], 1);
    assert_eq!(filtered["phone"], "+2");
    assert_eq!(filtered["messages"][0]["payload"]["from"], "+2");

    let (status, cleared) = send_empty(&app, Method::DELETE, "/scopes/s1/messages").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        cleared,
        json!({"success": true, "message": "All stored messages have been cleared"})
    );

    let (_, after) = send_empty(&app, Method::GET, "/scopes/s1/messages").await;
    assert_eq!(after["count"], 0);
}

#[tokio::test]
async fn test_phone_filter_ignores_cloud_envelopes() {
    let app = app();

    send_json(
        &app,
        Method::POST,
        "/webhook/s1",
        json!({
            "object": "whatsapp_business_account",
            "entry": [{"changes": [{"value": {"messages": [{"from": "+9"}]}}]}]
        }),
    )
    .await;

    let (_, filtered) = send_empty(&app, Method::GET, "/scopes/s1/messages?phone=%2B9").await;
    assert_eq!(filtered["count"], 0);
}

#[tokio::test]
async fn test_invalid_manual_payload_is_rejected() {
    let app = app();

    let (status, error) = send(
        &app,
        Method::POST,
        "/scopes/s1/messages",
        Body::from("{not json"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "invalid_payload");
    assert_eq!(error["error"], "Invalid JSON in Message Payload field");

    let (_, all) = send_empty(&app, Method::GET, "/scopes/s1/messages").await;
    assert_eq!(all["count"], 0);
}

#[tokio::test]
async fn test_store_actions_share_history_with_webhook() {
    let app = app();

    send_json(&app, Method::POST, "/webhook/s1", json!({"from": "+1"})).await;

    let (status, response) = send_json(
        &app,
        Method::POST,
        "/scopes/s1/actions",
        json!({
            "resource": "messageStore",
            "operation": "saveMessage",
            "items": [{"messagePayload": "{\"from\": \"+1\", \"manual\": true}"}]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["items"][0]["pairedItem"]["item"], 0);

    let (_, response) = send_json(
        &app,
        Method::POST,
        "/scopes/s1/actions",
        json!({
            "resource": "messageStore",
            "operation": "getMessagesByPhone",
            "items": [{"filterPhone": "+1"}]
        }),
    )
    .await;
    let listed = &response["items"][0]["json"];
    assert_eq!(listed["count"], 2);
    assert!(listed["messages"][0]["receivedAt"].is_string());
    assert!(listed["messages"][1]["savedAt"].is_string());
}

#[tokio::test]
async fn test_unknown_names_are_reported() {
    let app = app();

    let (status, error) = send_json(
        &app,
        Method::POST,
        "/scopes/s1/actions",
        json!({"resource": "contact", "operation": "create"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "unknown_resource");
    assert_eq!(error["error"], "Unknown resource: contact");

    let (status, error) = send_json(
        &app,
        Method::POST,
        "/scopes/s1/actions",
        json!({"resource": "messageStore", "operation": "purge"}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error["code"], "unknown_operation");
}

#[tokio::test]
async fn test_malformed_action_request() {
    let (status, error) = send(
        &app(),
        Method::POST,
        "/scopes/s1/actions",
        Body::from("{\"operation\": \"x\"}"),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(error["code"], "input_error");
}

#[tokio::test]
async fn test_send_actions_reach_outbound_api() {
    let api = Arc::new(RecordingApi::default());
    let shared: Arc<dyn WcrmApi> = api.clone();
    let app = app_with_api(Some(shared));

    let (status, response) = send_json(
        &app,
        Method::POST,
        "/scopes/s1/actions",
        json!({
            "resource": "message",
            "operation": "sendDocument",
            "items": [
                {"to": "+1", "documentUrl": "https://example.com/a.pdf", "documentCaption": "A"},
                {"to": "+2", "documentUrl": "https://example.com/b.pdf"}
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["items"].as_array().unwrap().len(), 2);
    assert_eq!(response["items"][1]["json"]["to"], "+2");
    assert_eq!(response["items"][1]["pairedItem"]["item"], 1);

    let requests = api.requests.lock().await;
    assert_eq!(requests.len(), 2);
    assert_eq!(
        requests[0]["messageObject"]["document"],
        json!({"link": "https://example.com/a.pdf", "caption": "A"})
    );
}

#[tokio::test]
async fn test_continue_on_fail_collects_upstream_errors() {
    let api: Arc<dyn WcrmApi> = Arc::new(RecordingApi {
        fail_with: Some("503 Service Unavailable".to_string()),
        ..RecordingApi::default()
    });
    let app = app_with_api(Some(api));

    let request = json!({
        "resource": "message",
        "operation": "sendText",
        "items": [{"to": "+1", "textBody": "hi"}, {"textBody": "no recipient"}],
        "continueOnFail": true
    });
    let (status, response) = send_json(&app, Method::POST, "/scopes/s1/actions", request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        response["items"][0]["json"]["error"],
        "Upstream request failed: 503 Service Unavailable"
    );
    assert_eq!(
        response["items"][1]["json"]["error"],
        "Missing required parameter 'to'"
    );

    let mut aborting = json!({
        "resource": "message",
        "operation": "sendText",
        "items": [{"to": "+1", "textBody": "hi"}]
    });
    aborting["continueOnFail"] = json!(false);
    let (status, error) = send_json(&app, Method::POST, "/scopes/s1/actions", aborting).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(error["code"], "upstream_error");
}

#[tokio::test]
async fn test_send_without_api_key_is_config_error() {
    let (status, error) = send_json(
        &app(),
        Method::POST,
        "/scopes/s1/actions",
        json!({
            "resource": "template",
            "operation": "sendTemplate",
            "items": [{"to": "+1", "templateName": "welcome", "templateVariables": "[]"}]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(error["code"], "config_error");
}

#[tokio::test]
async fn test_manual_saves_respect_configured_capacity() {
    let app = app_with_settings(WebhookSettings {
        max_stored_messages: 3,
        store_messages: false,
        ..WebhookSettings::default()
    });

    for n in 1..=5 {
        let (status, _) =
            send_json(&app, Method::POST, "/scopes/s/messages", json!({"from": "+1", "n": n}))
                .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, all) = send_empty(&app, Method::GET, "/scopes/s/messages").await;
    assert_eq!(all["count"], 3);
    let kept: Vec<i64> = all["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|record| record["payload"]["n"].as_i64().unwrap())
        .collect();
    assert_eq!(kept, vec![3, 4, 5]);
}
