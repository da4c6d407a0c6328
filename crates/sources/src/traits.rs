//! Source client seams, one per dataset.
//!
//! Fetches are side-effect free with respect to the database; network I/O
//! is allowed. Jobs hold `Arc<dyn …>` so tests can substitute failing or
//! canned sources.

use async_trait::async_trait;
use serde_json::{Map, Value};

use etl_core::{BusinessDensityRow, DemographicsRow, LabourStatsRow, Result, SpendingRow};

#[async_trait]
pub trait DemographicsSource: Send + Sync {
    async fn fetch(
        &self,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<Vec<DemographicsRow>>;
}

#[async_trait]
pub trait SpendingSource: Send + Sync {
    async fn fetch(
        &self,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<Vec<SpendingRow>>;
}

#[async_trait]
pub trait LabourStatsSource: Send + Sync {
    async fn fetch(
        &self,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<Vec<LabourStatsRow>>;
}

#[async_trait]
pub trait BusinessDensitySource: Send + Sync {
    async fn fetch(
        &self,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<Vec<BusinessDensityRow>>;
}
