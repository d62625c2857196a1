//! `{"status": "OK"|"Error", "message"?, "data"?}` response envelope.
//!
//! Mirrors `gateway_service.py`'s `json_response` helper verbatim in shape:
//! every handler, success or failure, resolves to one of these envelopes
//! rather than axum's usual per-status body conventions. Kept deliberately
//! unusual for an axum service — see DESIGN.md for why this wire shape is
//! preserved rather than redesigned.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::Value;

use crate::error::GatewayError;

/// The envelope every `/<action>` response is wrapped in.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Build a `200 OK` envelope carrying `data`.
pub fn ok(data: impl Serialize) -> Response {
    let body = GatewayResponse {
        status: "OK",
        message: None,
        data: Some(serde_json::to_value(data).unwrap_or(Value::Null)),
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// Build an error envelope at `code`, carrying `message`.
pub fn error(code: StatusCode, message: impl Into<String>) -> Response {
    let body = GatewayResponse { status: "Error", message: Some(message.into()), data: None };
    (code, Json(body)).into_response()
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        error(self.status_code(), self.to_string())
    }
}
