//! Deterministic local/dev source clients.
//!
//! These generate stable rows for the three sub-city regions derived from
//! the city slug. Values are deterministic so repeated runs (and tests)
//! see identical data; a production deployment swaps these for real
//! provider clients (census bureau, BLS/ONS/StatCan, SHS/CEX).

use async_trait::async_trait;
use serde_json::{Map, Value};

use etl_core::{DemographicsRow, LabourStatsRow, Result, SpendingRow};

use crate::city_slug;
use crate::traits::{DemographicsSource, LabourStatsSource, SpendingSource};

const DEFAULT_COUNTRY: &str = "NA";
const DEFAULT_CITY: &str = "Unknown";

fn region_geo_ids(city: &str) -> Vec<String> {
    let slug = city_slug(city);
    vec![
        format!("{slug}-central"),
        format!("{slug}-north"),
        format!("{slug}-south"),
    ]
}

/// Deterministic demographics source.
#[derive(Debug, Clone, Default)]
pub struct StubDemographicsSource;

#[async_trait]
impl DemographicsSource for StubDemographicsSource {
    async fn fetch(
        &self,
        country: Option<&str>,
        city: Option<&str>,
        _options: &Map<String, Value>,
    ) -> Result<Vec<DemographicsRow>> {
        let resolved_country = country.unwrap_or(DEFAULT_COUNTRY);
        let resolved_city = city.unwrap_or(DEFAULT_CITY);

        let base_population = 150_000i64;
        let base_income = 50_000f64;

        let rows = region_geo_ids(resolved_city)
            .into_iter()
            .enumerate()
            .map(|(index, geo_id)| DemographicsRow {
                tenant_id: None,
                geo_id,
                country: resolved_country.to_string(),
                city: resolved_city.to_string(),
                population_total: Some(base_population + (index as i64 * 20_000)),
                median_income: Some(base_income + (index as f64 * 5_000.0)),
                age_distribution: None,
                education_levels: None,
                household_size_avg: None,
                immigration_ratio: None,
                coordinates: None,
            })
            .collect();

        Ok(rows)
    }
}

/// Deterministic labour stats source with values in realistic ranges.
#[derive(Debug, Clone, Default)]
pub struct StubLabourStatsSource;

#[async_trait]
impl LabourStatsSource for StubLabourStatsSource {
    async fn fetch(
        &self,
        country: Option<&str>,
        city: Option<&str>,
        _options: &Map<String, Value>,
    ) -> Result<Vec<LabourStatsRow>> {
        let resolved_country = country.unwrap_or(DEFAULT_COUNTRY);
        let resolved_city = city.unwrap_or(DEFAULT_CITY);

        let rows = region_geo_ids(resolved_city)
            .into_iter()
            .enumerate()
            .map(|(idx, geo_id)| LabourStatsRow {
                tenant_id: None,
                geo_id,
                country: resolved_country.to_string(),
                city: resolved_city.to_string(),
                unemployment_rate: Some(4.0 + (idx as f64 * 0.7)),
                job_openings: Some(1_000 + (idx as i64 * 250)),
                median_salary: Some(55_000.0 + (idx as f64 * 3_000.0)),
                labour_force_participation: Some(61.0 + (idx as f64 * 0.8)),
            })
            .collect();

        Ok(rows)
    }
}

/// Deterministic spending source; categories come from
/// `options.categories` (list of strings) with a fixed default.
#[derive(Debug, Clone, Default)]
pub struct StubSpendingSource;

fn base_spend_for(category: &str) -> f64 {
    match category {
        "groceries" => 350.0,
        "dining" => 220.0,
        "transport" => 180.0,
        _ => 200.0,
    }
}

#[async_trait]
impl SpendingSource for StubSpendingSource {
    async fn fetch(
        &self,
        country: Option<&str>,
        city: Option<&str>,
        options: &Map<String, Value>,
    ) -> Result<Vec<SpendingRow>> {
        let resolved_country = country.unwrap_or(DEFAULT_COUNTRY);
        let resolved_city = city.unwrap_or(DEFAULT_CITY);

        let categories: Vec<String> = options
            .get("categories")
            .and_then(Value::as_array)
            .and_then(|items| {
                items
                    .iter()
                    .map(|item| item.as_str().map(str::to_owned))
                    .collect::<Option<Vec<String>>>()
            })
            .unwrap_or_else(|| {
                vec![
                    "groceries".to_string(),
                    "dining".to_string(),
                    "transport".to_string(),
                ]
            });

        let mut rows = Vec::new();
        for (geo_idx, geo_id) in region_geo_ids(resolved_city).into_iter().enumerate() {
            let region_multiplier = 1.0 + (geo_idx as f64 * 0.07);
            for (cat_idx, category) in categories.iter().enumerate() {
                let base = base_spend_for(category);
                let avg_monthly_spend = base * region_multiplier * (1.0 + (cat_idx as f64 * 0.03));
                // Spend index stays a simple ratio to the category base.
                let spend_index = if base != 0.0 {
                    Some(avg_monthly_spend / base)
                } else {
                    None
                };

                rows.push(SpendingRow {
                    tenant_id: None,
                    geo_id: geo_id.clone(),
                    country: resolved_country.to_string(),
                    city: resolved_city.to_string(),
                    category: category.clone(),
                    avg_monthly_spend: Some(avg_monthly_spend),
                    spend_index,
                });
            }
        }

        Ok(rows)
    }
}
