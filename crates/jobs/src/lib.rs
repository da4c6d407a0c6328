//! ETL jobs and dispatch workers.
//!
//! Four dataset jobs share one shape: fetch from the source client, upsert
//! through the dataset repository, record freshness, append an audit log
//! entry, and propagate failures after writing the FAILED bookkeeping.
//! The embedding rebuild job derives per-region documents from the four
//! datasets and maintains the vector store. Two workers route decoded
//! queue payloads to the jobs.

pub mod business_density;
pub mod demographics;
pub mod embedding_worker;
pub mod ingestion_worker;
pub mod labour_stats;
pub mod rebuild_embeddings;
pub mod spending;

pub use business_density::BusinessDensityEtlJob;
pub use demographics::DemographicsEtlJob;
pub use embedding_worker::{EmbeddingHandler, EmbeddingWorker};
pub use ingestion_worker::{IngestionHandler, IngestionWorker};
pub use labour_stats::LabourStatsEtlJob;
pub use rebuild_embeddings::RebuildEmbeddingsJob;
pub use spending::SpendingEtlJob;

use serde_json::{json, Map, Value};

/// Audit payload shared by the dataset jobs: the inbound request echoed
/// back, with options always present.
fn audit_payload(country: Option<&str>, city: Option<&str>, options: &Map<String, Value>) -> Value {
    json!({
        "country": country,
        "city": city,
        "options": options,
    })
}
