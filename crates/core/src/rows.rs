//! Dataset row shapes for the normalized market tables.
//!
//! Natural keys: demographics and labour stats key on
//! `(geo_id, city, country)`; spending adds `category`; business density
//! adds `business_type`. Everything outside the key and `tenant_id` is
//! overwritable on upsert; `last_updated` is stamped by the job, not the
//! source client, so rows here carry no timestamp.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Demographics row for one sub-city region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemographicsRow {
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    pub geo_id: String,
    pub country: String,
    pub city: String,
    pub population_total: Option<i64>,
    pub median_income: Option<f64>,
    pub age_distribution: Option<Value>,
    pub education_levels: Option<Value>,
    pub household_size_avg: Option<f64>,
    pub immigration_ratio: Option<f64>,
    pub coordinates: Option<Value>,
}

/// Consumer spending row for one region and category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpendingRow {
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    pub geo_id: String,
    pub country: String,
    pub city: String,
    pub category: String,
    pub avg_monthly_spend: Option<f64>,
    pub spend_index: Option<f64>,
}

/// Labour market row for one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabourStatsRow {
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    pub geo_id: String,
    pub country: String,
    pub city: String,
    pub unemployment_rate: Option<f64>,
    pub job_openings: Option<i64>,
    pub median_salary: Option<f64>,
    pub labour_force_participation: Option<f64>,
}

/// Business density row for one region and business type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessDensityRow {
    #[serde(default)]
    pub tenant_id: Option<Uuid>,
    pub geo_id: String,
    pub country: String,
    pub city: String,
    pub business_type: String,
    pub count: Option<i64>,
    pub density_score: Option<f64>,
    /// Capped list of coordinate samples from the provider.
    pub coordinates: Option<Value>,
}
