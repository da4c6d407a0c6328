//! Pipeline bookkeeping records: dataset freshness and the audit log.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Outcome of a job invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "COMPLETED",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-dataset freshness record; one row per dataset name, overwritten on
/// every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataFreshness {
    pub dataset_name: String,
    /// RFC 3339 UTC timestamp of the run.
    pub last_run: String,
    pub row_count: i64,
    pub status: String,
}

/// Append-only audit record of one job invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EtlLogEntry {
    pub id: Uuid,
    pub job_name: String,
    pub payload: Value,
    pub status: String,
    /// RFC 3339 UTC timestamp; same instant as the freshness record of the
    /// run that produced this entry.
    pub created_at: String,
}
