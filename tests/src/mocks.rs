//! Mock implementations for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde_json::{Map, Value};
use std::sync::Arc;
use uuid::Uuid;

use etl_core::{BusinessDensityRow, DemographicsRow, Error, Result, VectorInsight};
use market_store::{Store, VectorStore};
use sources::{BusinessDensitySource, DemographicsSource};

/// Source that always fails, for exercising the FAILED bookkeeping path.
pub struct FailingDemographicsSource {
    pub message: String,
}

impl FailingDemographicsSource {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl DemographicsSource for FailingDemographicsSource {
    async fn fetch(
        &self,
        _country: Option<&str>,
        _city: Option<&str>,
        _options: &Map<String, Value>,
    ) -> Result<Vec<DemographicsRow>> {
        Err(Error::source_fetch(self.message.clone()))
    }
}

/// Business density source returning canned rows, standing in for the
/// Overpass client so dispatch tests stay offline.
pub struct CannedBusinessDensitySource {
    pub rows: Vec<BusinessDensityRow>,
}

impl CannedBusinessDensitySource {
    pub fn new(rows: Vec<BusinessDensityRow>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl BusinessDensitySource for CannedBusinessDensitySource {
    async fn fetch(
        &self,
        _country: Option<&str>,
        _city: Option<&str>,
        _options: &Map<String, Value>,
    ) -> Result<Vec<BusinessDensityRow>> {
        Ok(self.rows.clone())
    }
}

/// Vector store spy that records upserted rows in memory.
#[derive(Clone, Default)]
pub struct RecordingVectorStore {
    rows: Arc<Mutex<Vec<VectorInsight>>>,
}

impl RecordingVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upserted_rows(&self) -> Vec<VectorInsight> {
        self.rows.lock().clone()
    }

    pub fn upsert_count(&self) -> usize {
        self.rows.lock().len()
    }
}

#[async_trait]
impl VectorStore for RecordingVectorStore {
    async fn upsert_many(
        &self,
        _store: &Store,
        rows: &[VectorInsight],
        _created_at: DateTime<Utc>,
    ) -> Result<usize> {
        self.rows.lock().extend_from_slice(rows);
        Ok(rows.len())
    }

    async fn list_by_geo_ids(
        &self,
        _store: &Store,
        geo_ids: &[String],
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<VectorInsight>> {
        Ok(self
            .rows
            .lock()
            .iter()
            .filter(|row| geo_ids.contains(&row.geo_id) && row.tenant_id == tenant_id)
            .cloned()
            .collect())
    }
}
