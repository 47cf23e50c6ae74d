//! API key check.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use panel_store::ApiKeyData;

use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Reject requests without a registered `X-API-Key`; on success the key
/// data rides along in request extensions for permission checks.
pub async fn require_api_key(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok());
    match token.and_then(|t| state.keys.verify(t)) {
        Some(data) => {
            req.extensions_mut().insert(data);
            next.run(req).await
        }
        None => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "valid API key required" })),
        )
            .into_response(),
    }
}

/// Admin gate for key management endpoints.
pub fn require_admin(key: &ApiKeyData) -> Result<(), crate::error::ApiError> {
    if key.is_admin() {
        Ok(())
    } else {
        Err(crate::error::ApiError::Forbidden("admin permission required"))
    }
}
