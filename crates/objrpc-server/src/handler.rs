//! HTTP request handlers.

use axum::{
    body::Bytes,
    extract::{RawQuery, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use objrpc::{error_payload, Endpoint, RpcConfig, CLIENT_JS};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, error};
use url::form_urlencoded;

/// Request fields of one RPC call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RpcForm {
    pub func: Option<String>,
    pub param: Option<String>,
}

impl RpcForm {
    /// Read the call fields from the query string and, for form-encoded
    /// POST/PUT/PATCH requests, from the body. Body values win; within one
    /// source the first occurrence of a field wins.
    pub fn from_request(
        method: &Method,
        query: Option<&str>,
        headers: &HeaderMap,
        body: &[u8],
    ) -> Self {
        let mut form = Self::default();
        if has_form_body(method, headers) {
            form.absorb(body);
        }
        if let Some(query) = query {
            form.absorb(query.as_bytes());
        }
        form
    }

    fn absorb(&mut self, encoded: &[u8]) {
        for (key, value) in form_urlencoded::parse(encoded) {
            if key == RpcConfig::FUNC_FIELD && self.func.is_none() {
                self.func = Some(value.into_owned());
            } else if key == RpcConfig::PARAM_FIELD && self.param.is_none() {
                self.param = Some(value.into_owned());
            }
        }
    }
}

fn has_form_body(method: &Method, headers: &HeaderMap) -> bool {
    if !matches!(*method, Method::POST | Method::PUT | Method::PATCH) {
        return false;
    }
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|mime| mime.trim().eq_ignore_ascii_case(RpcConfig::FORM_CONTENT_TYPE))
        .unwrap_or(false)
}

/// Health check endpoint.
pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

/// Serves the browser client script.
pub async fn handle_client() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, RpcConfig::JS_CONTENT_TYPE)], CLIENT_JS)
}

/// Main RPC handler. Always answers 200 with a JSON (or empty) body; call
/// failures travel in the `{"error": ...}` payload.
pub async fn handle_rpc(
    State(endpoint): State<Arc<Endpoint>>,
    method: Method,
    RawQuery(query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let form = RpcForm::from_request(&method, query.as_deref(), &headers, &body);
    let func = form.func.unwrap_or_default();
    let param = form.param.unwrap_or_default();

    debug!("RPC request: {} {}", method, func);

    // Receiver methods may block.
    let name = func.clone();
    let outcome =
        tokio::task::spawn_blocking(move || endpoint.handle(&name, param.as_bytes())).await;

    match outcome {
        Ok(payload) => json_response(StatusCode::OK, payload),
        Err(e) => {
            error!("RPC task for {} failed: {}", func, e);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_payload("Internal server error"),
            )
        }
    }
}

fn json_response(status: StatusCode, payload: Vec<u8>) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, RpcConfig::JSON_CONTENT_TYPE)],
        payload,
    )
        .into_response()
}
