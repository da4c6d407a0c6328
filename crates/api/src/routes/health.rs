//! Health endpoint.

use axum::{extract::State, Json};

use crate::response::HealthResponse;
use crate::state::AppState;

/// Liveness plus a database probe.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let database_connected = state.store.ping().await;

    Json(HealthResponse {
        status: if database_connected { "ok" } else { "degraded" }.to_string(),
        database_connected,
    })
}
