//! Canonical ingestion message structure.
//!
//! Built per dispatch call from an already-decoded queue payload. Some
//! producers only populate `job_name`, so the job identifier falls back to
//! that field when `dataset` is absent or empty.

use serde_json::{Map, Value};

/// Decoded job payload consumed by the dispatch workers.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionMessage {
    /// Raw job/dataset identifier, unnormalized.
    pub job: String,
    pub country: Option<String>,
    pub city: Option<String>,
    /// Optional region filter (embedding jobs only).
    pub regions: Option<Vec<String>>,
    pub options: Map<String, Value>,
}

impl IngestionMessage {
    pub fn from_payload(payload: &Value) -> Self {
        let job = non_empty_str(payload.get("dataset"))
            .or_else(|| non_empty_str(payload.get("job_name")))
            .unwrap_or_default();

        let regions = payload.get("regions").and_then(|value| {
            let items = value.as_array()?;
            items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<Vec<String>>>()
        });

        let options = payload
            .get("options")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();

        Self {
            job,
            country: str_field(payload, "country"),
            city: str_field(payload, "city"),
            regions,
            options,
        }
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

fn str_field(payload: &Value, field: &str) -> Option<String> {
    payload.get(field).and_then(Value::as_str).map(str::to_owned)
}
