//! Spending ETL job.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use tracing::{error, info};

use etl_core::{Dataset, EtlRunSummary, JobStatus, Result};
use market_store::{
    AuditLogger, DataFreshnessRepository, EtlLogRepository, FreshnessTracker, SpendingRepository,
    SpendingStore, Store,
};
use sources::{SpendingSource, StubSpendingSource};

use crate::audit_payload;

/// ETL job that loads consumer spending rows into the database.
pub struct SpendingEtlJob {
    repository: Arc<dyn SpendingStore>,
    freshness: Arc<dyn FreshnessTracker>,
    audit: Arc<dyn AuditLogger>,
    source: Arc<dyn SpendingSource>,
}

impl SpendingEtlJob {
    pub fn new(
        repository: Arc<dyn SpendingStore>,
        freshness: Arc<dyn FreshnessTracker>,
        audit: Arc<dyn AuditLogger>,
        source: Arc<dyn SpendingSource>,
    ) -> Self {
        Self {
            repository,
            freshness,
            audit,
            source,
        }
    }

    pub fn create_default() -> Self {
        Self::new(
            Arc::new(SpendingRepository::new()),
            Arc::new(DataFreshnessRepository::new()),
            Arc::new(EtlLogRepository::new()),
            Arc::new(StubSpendingSource),
        )
    }

    /// Execute one spending ETL run.
    pub async fn run(
        &self,
        store: &Store,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<EtlRunSummary> {
        let dataset_name = Dataset::Spending.name();
        let now = Utc::now();

        info!(
            dataset = %dataset_name,
            country = country.unwrap_or("-"),
            city = city.unwrap_or("-"),
            "Starting ETL run"
        );

        match self.execute(store, country, city, options, now).await {
            Ok(affected) => {
                info!(
                    dataset = %dataset_name,
                    row_count = affected,
                    status = %JobStatus::Completed,
                    "ETL run completed"
                );
                Ok(EtlRunSummary {
                    dataset_name: dataset_name.to_string(),
                    status: JobStatus::Completed,
                    row_count: affected as u64,
                    country: country.map(str::to_owned),
                    city: city.map(str::to_owned),
                })
            }
            Err(err) => {
                error!(
                    dataset = %dataset_name,
                    error = %err,
                    status = %JobStatus::Failed,
                    "ETL run failed"
                );
                self.freshness
                    .upsert_status(store, dataset_name, now, 0, JobStatus::Failed)
                    .await?;
                self.audit
                    .append(
                        store,
                        dataset_name,
                        audit_payload(country, city, options),
                        JobStatus::Failed,
                        now,
                    )
                    .await?;
                Err(err)
            }
        }
    }

    async fn execute(
        &self,
        store: &Store,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
        now: DateTime<Utc>,
    ) -> Result<usize> {
        let dataset_name = Dataset::Spending.name();

        let raw_rows = self.source.fetch(country, city, options).await?;
        let affected = self.repository.upsert_many(store, &raw_rows, now).await?;

        self.freshness
            .upsert_status(store, dataset_name, now, affected as i64, JobStatus::Completed)
            .await?;
        self.audit
            .append(
                store,
                dataset_name,
                audit_payload(country, city, options),
                JobStatus::Completed,
                now,
            )
            .await?;

        Ok(affected)
    }
}
