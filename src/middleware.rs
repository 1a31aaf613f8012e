//! Authentication middleware.

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;
use subtle::ConstantTimeEq;

/// Expected bearer key; `None` lets every request through.
#[derive(Clone, Default)]
pub struct ApiKey(pub Option<Arc<str>>);

/// Require `Authorization: Bearer <key>` when a key is configured.
///
/// Keys are compared in constant time.
pub async fn require_api_key(State(key): State<ApiKey>, req: Request, next: Next) -> Response {
    if let Some(expected) = &key.0 {
        let provided = req
            .headers()
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|auth| auth.strip_prefix("Bearer "))
            .unwrap_or("");

        let ok: bool = provided.as_bytes().ct_eq(expected.as_bytes()).into();
        if !ok {
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "missing or invalid API key" })),
            )
                .into_response();
        }
    }
    next.run(req).await
}
