//! Ingestion worker: routes decoded queue payloads to dataset ETL jobs.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use etl_core::{Dataset, Error, EtlRunSummary, IngestionMessage, Result};
use market_store::Store;
use sources::SourceConfig;

use crate::business_density::BusinessDensityEtlJob;
use crate::demographics::DemographicsEtlJob;
use crate::labour_stats::LabourStatsEtlJob;
use crate::spending::SpendingEtlJob;

/// Interface for dataset-specific ingestion jobs.
#[async_trait]
pub trait IngestionHandler: Send + Sync {
    async fn run(
        &self,
        store: &Store,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<EtlRunSummary>;
}

#[async_trait]
impl IngestionHandler for DemographicsEtlJob {
    async fn run(
        &self,
        store: &Store,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<EtlRunSummary> {
        DemographicsEtlJob::run(self, store, country, city, options).await
    }
}

#[async_trait]
impl IngestionHandler for SpendingEtlJob {
    async fn run(
        &self,
        store: &Store,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<EtlRunSummary> {
        SpendingEtlJob::run(self, store, country, city, options).await
    }
}

#[async_trait]
impl IngestionHandler for LabourStatsEtlJob {
    async fn run(
        &self,
        store: &Store,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<EtlRunSummary> {
        LabourStatsEtlJob::run(self, store, country, city, options).await
    }
}

#[async_trait]
impl IngestionHandler for BusinessDensityEtlJob {
    async fn run(
        &self,
        store: &Store,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<EtlRunSummary> {
        BusinessDensityEtlJob::run(self, store, country, city, options).await
    }
}

/// Dispatches ingestion messages to dataset-specific jobs.
///
/// The registry is keyed by canonical dataset; historical spellings
/// resolve through the alias table before lookup, so every spelling of a
/// dataset hits the same handler instance.
pub struct IngestionWorker {
    handlers: HashMap<Dataset, Arc<dyn IngestionHandler>>,
}

impl IngestionWorker {
    pub fn new(handlers: HashMap<Dataset, Arc<dyn IngestionHandler>>) -> Self {
        Self { handlers }
    }

    /// Default wiring: one job per dataset against the default sources.
    pub fn create_default(source_config: &SourceConfig) -> Result<Self> {
        let mut handlers: HashMap<Dataset, Arc<dyn IngestionHandler>> = HashMap::new();
        handlers.insert(
            Dataset::BusinessDensity,
            Arc::new(BusinessDensityEtlJob::create_default(source_config)?),
        );
        handlers.insert(
            Dataset::Demographics,
            Arc::new(DemographicsEtlJob::create_default()),
        );
        handlers.insert(
            Dataset::LabourStats,
            Arc::new(LabourStatsEtlJob::create_default()),
        );
        handlers.insert(Dataset::Spending, Arc::new(SpendingEtlJob::create_default()));
        Ok(Self::new(handlers))
    }

    /// Decode, route, and run one ingestion message; job errors propagate
    /// untouched.
    pub async fn consume(&self, store: &Store, payload: &Value) -> Result<Value> {
        let message = IngestionMessage::from_payload(payload);

        let dataset = Dataset::parse(&message.job)
            .ok_or_else(|| Error::unsupported_job(message.job.clone()))?;
        let handler = self
            .handlers
            .get(&dataset)
            .ok_or_else(|| Error::unsupported_job(message.job.clone()))?;

        info!(
            dataset = %dataset,
            country = message.country.as_deref().unwrap_or("-"),
            city = message.city.as_deref().unwrap_or("-"),
            "Consuming ingestion message"
        );

        let summary = handler
            .run(
                store,
                message.country.as_deref(),
                message.city.as_deref(),
                &message.options,
            )
            .await?;

        info!(
            dataset = %dataset,
            status = %summary.status,
            row_count = summary.row_count,
            "Ingestion message processed"
        );

        summary.to_value()
    }
}
