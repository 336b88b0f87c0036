//! Liveness endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health: answers as long as the process is serving requests.
///
/// The store is not probed; a failing backend shows up as `INTERNAL_ERROR`
/// responses and in the rejected-request counter instead.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
