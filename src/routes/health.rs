use axum::response::Json;
use serde_json::json;

/// Health check endpoint handler.
///
/// Lightweight liveness probe for load balancers and monitors.
///
/// # Route
/// - **Method**: GET
/// - **Path**: `/api/health`
/// - **Response**: `{"ok":true}` with 200 OK
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "ok": true }))
}
