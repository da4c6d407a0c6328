//! Trait seams between jobs and storage.
//!
//! One trait per role; jobs hold `Arc<dyn …>` and tests substitute fakes.
//! Every method takes the storage handle explicitly; repositories carry
//! no connection state of their own.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use etl_core::{
    BusinessDensityRow, DataFreshness, DemographicsRow, JobStatus, LabourStatsRow, Result,
    SpendingRow, VectorInsight,
};

use crate::store::Store;

#[async_trait]
pub trait DemographicsStore: Send + Sync {
    /// Insert-or-update keyed by `(geo_id, city, country)`; returns the
    /// number of rows processed.
    async fn upsert_many(
        &self,
        store: &Store,
        rows: &[DemographicsRow],
        last_updated: DateTime<Utc>,
    ) -> Result<usize>;

    /// All rows for a city (optionally country-scoped), ordered by
    /// `geo_id`, unfiltered by tenant.
    async fn list_for_city(
        &self,
        store: &Store,
        city: &str,
        country: Option<&str>,
    ) -> Result<Vec<DemographicsRow>>;
}

#[async_trait]
pub trait SpendingStore: Send + Sync {
    /// Insert-or-update keyed by `(geo_id, city, country, category)`.
    async fn upsert_many(
        &self,
        store: &Store,
        rows: &[SpendingRow],
        last_updated: DateTime<Utc>,
    ) -> Result<usize>;

    async fn list_for_city(
        &self,
        store: &Store,
        city: &str,
        country: Option<&str>,
    ) -> Result<Vec<SpendingRow>>;
}

#[async_trait]
pub trait LabourStatsStore: Send + Sync {
    /// Insert-or-update keyed by `(geo_id, city, country)`.
    async fn upsert_many(
        &self,
        store: &Store,
        rows: &[LabourStatsRow],
        last_updated: DateTime<Utc>,
    ) -> Result<usize>;

    async fn list_for_city(
        &self,
        store: &Store,
        city: &str,
        country: Option<&str>,
    ) -> Result<Vec<LabourStatsRow>>;
}

#[async_trait]
pub trait BusinessDensityStore: Send + Sync {
    /// Insert-or-update keyed by `(geo_id, city, country, business_type)`.
    async fn upsert_many(
        &self,
        store: &Store,
        rows: &[BusinessDensityRow],
        last_updated: DateTime<Utc>,
    ) -> Result<usize>;

    /// Ordered by `business_type` to match the provider listing order.
    async fn list_for_city(
        &self,
        store: &Store,
        city: &str,
        country: Option<&str>,
    ) -> Result<Vec<BusinessDensityRow>>;
}

#[async_trait]
pub trait FreshnessTracker: Send + Sync {
    /// Insert-or-overwrite the single status row for `dataset_name`.
    async fn upsert_status(
        &self,
        store: &Store,
        dataset_name: &str,
        last_run: DateTime<Utc>,
        row_count: i64,
        status: JobStatus,
    ) -> Result<DataFreshness>;
}

#[async_trait]
pub trait AuditLogger: Send + Sync {
    /// Append one immutable run record.
    async fn append(
        &self,
        store: &Store,
        job_name: &str,
        payload: Value,
        status: JobStatus,
        created_at: DateTime<Utc>,
    ) -> Result<()>;
}

#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert-or-update keyed by `(tenant_id, geo_id)`; NULL tenant matches
    /// only NULL.
    async fn upsert_many(
        &self,
        store: &Store,
        rows: &[VectorInsight],
        created_at: DateTime<Utc>,
    ) -> Result<usize>;

    async fn list_by_geo_ids(
        &self,
        store: &Store,
        geo_ids: &[String],
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<VectorInsight>>;
}
