use super::{AppState, Result, WebError};
use crate::actions::{
    ActionRequest, ClearedMessages, ItemResult, MessageList, SavedMessage,
    store::INVALID_MESSAGE_PAYLOAD,
};
use crate::core::BridgeError;
use crate::normalizer::NormalizedEvent;
use crate::webhook::headers_to_json;
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Debug, Default, Deserialize)]
pub struct MessagesQuery {
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub items: Vec<ItemResult>,
}

pub async fn healthcheck() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn receive_webhook(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<NormalizedEvent>> {
    let event = state
        .receiver
        .receive(&scope, headers_to_json(&headers), &body)
        .await?;
    Ok(Json(event))
}

pub async fn receive_default_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<NormalizedEvent>> {
    let event = state
        .receiver
        .receive_default(headers_to_json(&headers), &body)
        .await?;
    Ok(Json(event))
}

pub async fn list_messages(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Json<MessageList> {
    let list = match query.phone.as_deref() {
        Some(phone) => state.store().get_messages_by_phone(&scope, phone).await,
        None => state.store().get_all_messages(&scope).await,
    };
    Json(list)
}

pub async fn save_message(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    body: Bytes,
) -> Result<(StatusCode, Json<SavedMessage>)> {
    let payload: Value = serde_json::from_slice(&body)
        .map_err(|_| BridgeError::invalid_payload(INVALID_MESSAGE_PAYLOAD))?;
    let saved = state.store().save_message(&scope, &payload).await?;
    Ok((StatusCode::CREATED, Json(saved)))
}

pub async fn clear_messages(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> Json<ClearedMessages> {
    Json(state.store().clear_messages(&scope).await)
}

pub async fn run_actions(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    body: Bytes,
) -> Result<Json<ActionResponse>> {
    let request: ActionRequest = serde_json::from_slice(&body)
        .map_err(|err| WebError::Input(format!("invalid action request: {err}")))?;
    let items = state.executor.execute(&scope, &request).await?;
    Ok(Json(ActionResponse { items }))
}
