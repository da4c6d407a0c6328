//! Canonical job identifiers and alias normalization.
//!
//! Producers have used several historical spellings for the same dataset
//! (hyphenated, `-refresh` suffixed). Dispatch normalizes the raw
//! identifier and resolves it through a static alias table; anything that
//! does not resolve is rejected with the original spelling intact.

use serde::{Deserialize, Serialize};

/// Canonical ingestion datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    BusinessDensity,
    Demographics,
    LabourStats,
    Spending,
}

impl Dataset {
    /// Canonical dataset name as stored in freshness and audit records.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BusinessDensity => "business_density",
            Self::Demographics => "demographics",
            Self::LabourStats => "labour_stats",
            Self::Spending => "spending",
        }
    }

    /// Resolve a raw identifier to a canonical dataset.
    ///
    /// Returns `None` for unknown identifiers; callers reject those with
    /// the unnormalized input.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = normalize_dataset_name(raw);
        ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, dataset)| *dataset)
    }
}

impl std::fmt::Display for Dataset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Alias table after normalization. Canonical names are their own aliases.
const ALIASES: &[(&str, Dataset)] = &[
    ("business_density", Dataset::BusinessDensity),
    ("business_density_refresh", Dataset::BusinessDensity),
    ("demographics", Dataset::Demographics),
    ("census_demographics_refresh", Dataset::Demographics),
    ("labour_stats", Dataset::LabourStats),
    ("labour_stats_refresh", Dataset::LabourStats),
    ("spending", Dataset::Spending),
    ("spending_stats_refresh", Dataset::Spending),
];

/// Normalize an ingestion dataset identifier: trim, lower-case, and
/// collapse hyphens to underscores.
pub fn normalize_dataset_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace('-', "_")
}

/// Embedding jobs routed by the embedding worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmbeddingJob {
    RebuildEmbeddings,
}

impl EmbeddingJob {
    /// Canonical job name as recorded in the audit log.
    pub fn name(&self) -> &'static str {
        match self {
            Self::RebuildEmbeddings => "rebuild-embeddings",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match normalize_embedding_job_name(raw).as_str() {
            "rebuild-embeddings" | "rebuild_embeddings" => Some(Self::RebuildEmbeddings),
            _ => None,
        }
    }
}

impl std::fmt::Display for EmbeddingJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Embedding job names keep their hyphens; only case and whitespace are
/// normalized.
pub fn normalize_embedding_job_name(raw: &str) -> String {
    raw.trim().to_lowercase()
}
