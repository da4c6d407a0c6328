//! Data access for the `demographics` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use etl_core::{DemographicsRow, Result};

use crate::store::{db_err, Store};
use crate::traits::DemographicsStore;

/// SQLite repository for demographics rows.
#[derive(Debug, Clone, Default)]
pub struct DemographicsRepository;

impl DemographicsRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DemographicsStore for DemographicsRepository {
    async fn upsert_many(
        &self,
        store: &Store,
        rows: &[DemographicsRow],
        last_updated: DateTime<Utc>,
    ) -> Result<usize> {
        let mut affected = 0usize;
        let stamp = last_updated.to_rfc3339();

        for row in rows {
            let existing: Option<String> = sqlx::query_scalar(
                "SELECT id FROM demographics WHERE geo_id = ?1 AND city = ?2 AND country = ?3",
            )
            .bind(&row.geo_id)
            .bind(&row.city)
            .bind(&row.country)
            .fetch_optional(store.pool())
            .await
            .map_err(|e| db_err("select demographics", e))?;

            if let Some(id) = existing {
                sqlx::query(
                    r#"
                    UPDATE demographics SET
                        population_total = ?1,
                        median_income = ?2,
                        age_distribution = ?3,
                        education_levels = ?4,
                        household_size_avg = ?5,
                        immigration_ratio = ?6,
                        coordinates = ?7,
                        last_updated = ?8
                    WHERE id = ?9
                    "#,
                )
                .bind(row.population_total)
                .bind(row.median_income)
                .bind(json_text(&row.age_distribution))
                .bind(json_text(&row.education_levels))
                .bind(row.household_size_avg)
                .bind(row.immigration_ratio)
                .bind(json_text(&row.coordinates))
                .bind(&stamp)
                .bind(&id)
                .execute(store.pool())
                .await
                .map_err(|e| db_err("update demographics", e))?;
            } else {
                sqlx::query(
                    r#"
                    INSERT INTO demographics (
                        id, tenant_id, geo_id, country, city,
                        population_total, median_income, age_distribution,
                        education_levels, household_size_avg,
                        immigration_ratio, coordinates, last_updated
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(row.tenant_id.map(|t| t.to_string()))
                .bind(&row.geo_id)
                .bind(&row.country)
                .bind(&row.city)
                .bind(row.population_total)
                .bind(row.median_income)
                .bind(json_text(&row.age_distribution))
                .bind(json_text(&row.education_levels))
                .bind(row.household_size_avg)
                .bind(row.immigration_ratio)
                .bind(json_text(&row.coordinates))
                .bind(&stamp)
                .execute(store.pool())
                .await
                .map_err(|e| db_err("insert demographics", e))?;
            }

            affected += 1;
        }

        Ok(affected)
    }

    async fn list_for_city(
        &self,
        store: &Store,
        city: &str,
        country: Option<&str>,
    ) -> Result<Vec<DemographicsRow>> {
        let rows = match country {
            Some(country) => {
                sqlx::query(
                    r#"
                    SELECT tenant_id, geo_id, country, city, population_total,
                           median_income, age_distribution, education_levels,
                           household_size_avg, immigration_ratio, coordinates
                    FROM demographics
                    WHERE city = ?1 AND country = ?2
                    ORDER BY geo_id
                    "#,
                )
                .bind(city)
                .bind(country)
                .fetch_all(store.pool())
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT tenant_id, geo_id, country, city, population_total,
                           median_income, age_distribution, education_levels,
                           household_size_avg, immigration_ratio, coordinates
                    FROM demographics
                    WHERE city = ?1
                    ORDER BY geo_id
                    "#,
                )
                .bind(city)
                .fetch_all(store.pool())
                .await
            }
        }
        .map_err(|e| db_err("list demographics", e))?;

        rows.into_iter().map(from_row).collect()
    }
}

fn from_row(row: SqliteRow) -> Result<DemographicsRow> {
    Ok(DemographicsRow {
        tenant_id: parse_uuid(row.try_get("tenant_id").map_err(|e| db_err("read demographics", e))?),
        geo_id: row.try_get("geo_id").map_err(|e| db_err("read demographics", e))?,
        country: row.try_get("country").map_err(|e| db_err("read demographics", e))?,
        city: row.try_get("city").map_err(|e| db_err("read demographics", e))?,
        population_total: row
            .try_get("population_total")
            .map_err(|e| db_err("read demographics", e))?,
        median_income: row
            .try_get("median_income")
            .map_err(|e| db_err("read demographics", e))?,
        age_distribution: parse_json(
            row.try_get("age_distribution")
                .map_err(|e| db_err("read demographics", e))?,
        ),
        education_levels: parse_json(
            row.try_get("education_levels")
                .map_err(|e| db_err("read demographics", e))?,
        ),
        household_size_avg: row
            .try_get("household_size_avg")
            .map_err(|e| db_err("read demographics", e))?,
        immigration_ratio: row
            .try_get("immigration_ratio")
            .map_err(|e| db_err("read demographics", e))?,
        coordinates: parse_json(
            row.try_get("coordinates")
                .map_err(|e| db_err("read demographics", e))?,
        ),
    })
}

/// Serialize an optional JSON column for storage.
pub(crate) fn json_text(value: &Option<Value>) -> Option<String> {
    value.as_ref().map(Value::to_string)
}

/// Parse an optional JSON column; malformed text is treated as absent.
pub(crate) fn parse_json(text: Option<String>) -> Option<Value> {
    text.and_then(|t| serde_json::from_str(&t).ok())
}

/// Parse an optional uuid column; malformed text is treated as absent.
pub(crate) fn parse_uuid(text: Option<String>) -> Option<Uuid> {
    text.and_then(|t| Uuid::parse_str(&t).ok())
}
