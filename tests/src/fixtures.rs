//! Test fixtures: payloads, envelopes, and row builders.

use serde_json::{json, Value};

use etl_core::BusinessDensityRow;

/// Decoded ingestion job payload.
pub fn ingestion_payload(dataset: &str, country: &str, city: &str) -> Value {
    json!({
        "dataset": dataset,
        "country": country,
        "city": city,
        "options": {},
    })
}

/// Decoded embedding job payload.
pub fn embedding_payload(city: &str) -> Value {
    json!({
        "job_name": "rebuild-embeddings",
        "country": "GH",
        "city": city,
        "options": {},
    })
}

/// Queue push envelope wrapping a decoded job payload.
pub fn push_envelope(payload: Value) -> Value {
    json!({
        "message": {
            "data": payload,
            "attributes": {},
        },
        "subscription": "projects/test/subscriptions/ingestion-jobs",
    })
}

/// Canned business density row for a city-level region.
pub fn density_row(city: &str, business_type: &str, count: i64) -> BusinessDensityRow {
    let slug = city.trim().to_lowercase().replace(' ', "-");
    BusinessDensityRow {
        tenant_id: None,
        geo_id: format!("{slug}-city"),
        country: "GH".into(),
        city: city.into(),
        business_type: business_type.into(),
        count: Some(count),
        density_score: None,
        coordinates: None,
    }
}
