//! Embedding worker: routes decoded queue payloads to embedding jobs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use embeddings::EmbeddingConfig;
use etl_core::{
    EmbeddingJob, Error, IngestionMessage, RebuildEmbeddingsSummary, Result,
};
use market_store::Store;

use crate::rebuild_embeddings::RebuildEmbeddingsJob;

/// Interface for embedding jobs.
#[async_trait]
pub trait EmbeddingHandler: Send + Sync {
    async fn run(
        &self,
        store: &Store,
        country: Option<&str>,
        city: Option<&str>,
        regions: Option<&[String]>,
        options: &Map<String, Value>,
    ) -> Result<RebuildEmbeddingsSummary>;
}

#[async_trait]
impl EmbeddingHandler for RebuildEmbeddingsJob {
    async fn run(
        &self,
        store: &Store,
        country: Option<&str>,
        city: Option<&str>,
        regions: Option<&[String]>,
        options: &Map<String, Value>,
    ) -> Result<RebuildEmbeddingsSummary> {
        // Worker-dispatched rebuilds are tenant-unscoped; tenant-scoped
        // rebuilds run through the job API directly.
        RebuildEmbeddingsJob::run(self, store, country, city, regions, options, None).await
    }
}

/// Dispatches embedding messages to embedding jobs.
pub struct EmbeddingWorker {
    handlers: HashMap<EmbeddingJob, Arc<dyn EmbeddingHandler>>,
}

impl EmbeddingWorker {
    pub fn new(handlers: HashMap<EmbeddingJob, Arc<dyn EmbeddingHandler>>) -> Self {
        Self { handlers }
    }

    /// Default wiring: the rebuild job against the configured embedding
    /// client.
    pub fn create_default(embedding_config: &EmbeddingConfig) -> Result<Self> {
        let mut handlers: HashMap<EmbeddingJob, Arc<dyn EmbeddingHandler>> = HashMap::new();
        handlers.insert(
            EmbeddingJob::RebuildEmbeddings,
            Arc::new(RebuildEmbeddingsJob::create_default(embedding_config)?),
        );
        Ok(Self::new(handlers))
    }

    /// Decode, route, and run one embedding message; job errors propagate
    /// untouched.
    pub async fn consume(&self, store: &Store, payload: &Value) -> Result<Value> {
        let message = IngestionMessage::from_payload(payload);

        let job = EmbeddingJob::parse(&message.job)
            .ok_or_else(|| Error::unsupported_job(message.job.clone()))?;
        let handler = self
            .handlers
            .get(&job)
            .ok_or_else(|| Error::unsupported_job(message.job.clone()))?;

        info!(
            job_name = %job,
            country = message.country.as_deref().unwrap_or("-"),
            city = message.city.as_deref().unwrap_or("-"),
            region_count = message.regions.as_ref().map(Vec::len),
            "Consuming embedding message"
        );

        let summary = handler
            .run(
                store,
                message.country.as_deref(),
                message.city.as_deref(),
                message.regions.as_deref(),
                &message.options,
            )
            .await?;

        info!(
            job_name = %job,
            status = %summary.status,
            row_count = summary.row_count,
            "Embedding message processed"
        );

        summary.to_value()
    }
}
