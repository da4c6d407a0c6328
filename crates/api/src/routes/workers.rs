//! Worker endpoints for queue push subscriptions.
//!
//! These run as separate push targets ("data-ingestion-worker" /
//! "embedding-worker") but live in the same codebase. Payloads arrive
//! already decoded: `message.data` is the inline JSON job payload.

use axum::{extract::State, Json};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;
use validator::{Validate, ValidationError};

use crate::response::{ApiError, WorkerResponse};
use crate::state::AppState;

/// Push message wrapper around one decoded job payload.
#[derive(Debug, Deserialize, Validate)]
pub struct PushMessage {
    #[validate(custom(function = "validate_json_object"))]
    pub data: Value,
    pub attributes: Option<std::collections::HashMap<String, String>>,
}

/// Push envelope delivered by the queue runtime.
#[derive(Debug, Deserialize, Validate)]
pub struct PushEnvelope {
    #[validate(nested)]
    pub message: PushMessage,
    pub subscription: Option<String>,
}

fn validate_json_object(data: &Value) -> Result<(), ValidationError> {
    if data.is_object() {
        Ok(())
    } else {
        Err(ValidationError::new("payload_not_object"))
    }
}

fn validate_envelope(envelope: &PushEnvelope) -> Result<(), ApiError> {
    envelope.validate().map_err(|e| {
        warn!(error = %e, "Rejected malformed push envelope");
        ApiError::bad_request("Invalid push message payload")
    })
}

/// Consume one ingestion job delivery.
pub async fn consume_ingestion_job(
    State(state): State<AppState>,
    Json(envelope): Json<PushEnvelope>,
) -> Result<Json<WorkerResponse>, ApiError> {
    validate_envelope(&envelope)?;

    let result = state
        .ingestion
        .consume(&state.store, &envelope.message.data)
        .await?;

    Ok(Json(WorkerResponse::ok(result)))
}

/// Consume one embedding job delivery.
pub async fn consume_embedding_job(
    State(state): State<AppState>,
    Json(envelope): Json<PushEnvelope>,
) -> Result<Json<WorkerResponse>, ApiError> {
    validate_envelope(&envelope)?;

    let result = state
        .embeddings
        .consume(&state.store, &envelope.message.data)
        .await?;

    Ok(Json(WorkerResponse::ok(result)))
}
