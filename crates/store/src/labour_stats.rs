//! Data access for the `labour_stats` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use etl_core::{LabourStatsRow, Result};

use crate::demographics::parse_uuid;
use crate::store::{db_err, Store};
use crate::traits::LabourStatsStore;

/// SQLite repository for labour stats rows.
#[derive(Debug, Clone, Default)]
pub struct LabourStatsRepository;

impl LabourStatsRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LabourStatsStore for LabourStatsRepository {
    async fn upsert_many(
        &self,
        store: &Store,
        rows: &[LabourStatsRow],
        last_updated: DateTime<Utc>,
    ) -> Result<usize> {
        let mut affected = 0usize;
        let stamp = last_updated.to_rfc3339();

        for row in rows {
            let existing: Option<String> = sqlx::query_scalar(
                "SELECT id FROM labour_stats WHERE geo_id = ?1 AND city = ?2 AND country = ?3",
            )
            .bind(&row.geo_id)
            .bind(&row.city)
            .bind(&row.country)
            .fetch_optional(store.pool())
            .await
            .map_err(|e| db_err("select labour_stats", e))?;

            if let Some(id) = existing {
                sqlx::query(
                    r#"
                    UPDATE labour_stats SET
                        unemployment_rate = ?1,
                        job_openings = ?2,
                        median_salary = ?3,
                        labour_force_participation = ?4,
                        last_updated = ?5
                    WHERE id = ?6
                    "#,
                )
                .bind(row.unemployment_rate)
                .bind(row.job_openings)
                .bind(row.median_salary)
                .bind(row.labour_force_participation)
                .bind(&stamp)
                .bind(&id)
                .execute(store.pool())
                .await
                .map_err(|e| db_err("update labour_stats", e))?;
            } else {
                sqlx::query(
                    r#"
                    INSERT INTO labour_stats (
                        id, tenant_id, geo_id, country, city,
                        unemployment_rate, job_openings, median_salary,
                        labour_force_participation, last_updated
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(row.tenant_id.map(|t| t.to_string()))
                .bind(&row.geo_id)
                .bind(&row.country)
                .bind(&row.city)
                .bind(row.unemployment_rate)
                .bind(row.job_openings)
                .bind(row.median_salary)
                .bind(row.labour_force_participation)
                .bind(&stamp)
                .execute(store.pool())
                .await
                .map_err(|e| db_err("insert labour_stats", e))?;
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
    ) -> Result<Vec<LabourStatsRow>> {
        let rows = match country {
            Some(country) => {
                sqlx::query(
                    r#"
                    SELECT tenant_id, geo_id, country, city, unemployment_rate,
                           job_openings, median_salary, labour_force_participation
                    FROM labour_stats
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
                    SELECT tenant_id, geo_id, country, city, unemployment_rate,
                           job_openings, median_salary, labour_force_participation
                    FROM labour_stats
                    WHERE city = ?1
                    ORDER BY geo_id
                    "#,
                )
                .bind(city)
                .fetch_all(store.pool())
                .await
            }
        }
        .map_err(|e| db_err("list labour_stats", e))?;

        rows.into_iter().map(from_row).collect()
    }
}

fn from_row(row: SqliteRow) -> Result<LabourStatsRow> {
    Ok(LabourStatsRow {
        tenant_id: parse_uuid(
            row.try_get("tenant_id")
                .map_err(|e| db_err("read labour_stats", e))?,
        ),
        geo_id: row.try_get("geo_id").map_err(|e| db_err("read labour_stats", e))?,
        country: row
            .try_get("country")
            .map_err(|e| db_err("read labour_stats", e))?,
        city: row.try_get("city").map_err(|e| db_err("read labour_stats", e))?,
        unemployment_rate: row
            .try_get("unemployment_rate")
            .map_err(|e| db_err("read labour_stats", e))?,
        job_openings: row
            .try_get("job_openings")
            .map_err(|e| db_err("read labour_stats", e))?,
        median_salary: row
            .try_get("median_salary")
            .map_err(|e| db_err("read labour_stats", e))?,
        labour_force_participation: row
            .try_get("labour_force_participation")
            .map_err(|e| db_err("read labour_stats", e))?,
    })
}
