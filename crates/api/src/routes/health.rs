//! Liveness endpoint.
//!
//! Deliberately shallow: it reports that the process is serving requests,
//! not that the backing store is reachable.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /health — reports that the server is up.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
