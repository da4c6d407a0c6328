//! Core types, job identifiers, and errors for the marketscope ETL pipeline.

pub mod dataset;
pub mod error;
pub mod insights;
pub mod message;
pub mod rows;
pub mod summary;
pub mod system;

pub use dataset::{normalize_dataset_name, normalize_embedding_job_name, Dataset, EmbeddingJob};
pub use error::{Error, Result};
pub use insights::VectorInsight;
pub use message::IngestionMessage;
pub use rows::*;
pub use summary::{EtlRunSummary, RebuildEmbeddingsSummary};
pub use system::{DataFreshness, EtlLogEntry, JobStatus};
