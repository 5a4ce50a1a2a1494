//! HTTP surface
//!
//! # Architecture
//!
//! - **state.rs**: shared state handed to every handler
//! - **handlers.rs**: webhook, message store, actions and health endpoints
//! - **router.rs**: route table and middleware
//!
//! Every failure is rendered as `{ "error": <message>, "code": <code> }`.

pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;

use crate::core::BridgeError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

#[derive(Debug)]
pub enum WebError {
    Bridge(BridgeError),
    /// Request body that could not be decoded into the expected shape.
    Input(String),
}

impl From<BridgeError> for WebError {
    fn from(err: BridgeError) -> Self {
        WebError::Bridge(err)
    }
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Bridge(err) => match err {
                BridgeError::EmptyPayload
                | BridgeError::UnknownOperation(_)
                | BridgeError::UnknownResource(_) => StatusCode::BAD_REQUEST,
                BridgeError::InvalidPayload(_) | BridgeError::MissingParameter(_) => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                BridgeError::Upstream(_) => StatusCode::BAD_GATEWAY,
                BridgeError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            WebError::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, code) = match self {
            WebError::Bridge(err) => (err.to_string(), err.code().to_string()),
            WebError::Input(msg) => (msg, "input_error".to_string()),
        };

        let body = Json(ErrorResponse {
            error: message,
            code,
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, WebError>;
