//! Transient run summaries returned to the dispatch workers.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::system::JobStatus;

/// Result summary for one dataset ETL run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlRunSummary {
    pub dataset_name: String,
    pub status: JobStatus,
    pub row_count: u64,
    pub country: Option<String>,
    pub city: Option<String>,
}

impl EtlRunSummary {
    /// Plain key-value map handed back to the queue/HTTP boundary.
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Result summary for one embeddings rebuild run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RebuildEmbeddingsSummary {
    pub job_name: String,
    pub status: JobStatus,
    pub row_count: u64,
    pub country: Option<String>,
    pub city: Option<String>,
    pub region_count: u64,
}

impl RebuildEmbeddingsSummary {
    pub fn to_value(&self) -> Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
