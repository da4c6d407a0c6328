//! Data access for the `business_density` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use etl_core::{BusinessDensityRow, Result};

use crate::demographics::{json_text, parse_json, parse_uuid};
use crate::store::{db_err, Store};
use crate::traits::BusinessDensityStore;

/// SQLite repository for business density rows.
#[derive(Debug, Clone, Default)]
pub struct BusinessDensityRepository;

impl BusinessDensityRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BusinessDensityStore for BusinessDensityRepository {
    async fn upsert_many(
        &self,
        store: &Store,
        rows: &[BusinessDensityRow],
        last_updated: DateTime<Utc>,
    ) -> Result<usize> {
        let mut affected = 0usize;
        let stamp = last_updated.to_rfc3339();

        for row in rows {
            let existing: Option<String> = sqlx::query_scalar(
                r#"
                SELECT id FROM business_density
                WHERE geo_id = ?1 AND city = ?2 AND country = ?3 AND business_type = ?4
                "#,
            )
            .bind(&row.geo_id)
            .bind(&row.city)
            .bind(&row.country)
            .bind(&row.business_type)
            .fetch_optional(store.pool())
            .await
            .map_err(|e| db_err("select business_density", e))?;

            if let Some(id) = existing {
                sqlx::query(
                    r#"
                    UPDATE business_density SET
                        count = ?1,
                        density_score = ?2,
                        coordinates = ?3,
                        last_updated = ?4
                    WHERE id = ?5
                    "#,
                )
                .bind(row.count)
                .bind(row.density_score)
                .bind(json_text(&row.coordinates))
                .bind(&stamp)
                .bind(&id)
                .execute(store.pool())
                .await
                .map_err(|e| db_err("update business_density", e))?;
            } else {
                sqlx::query(
                    r#"
                    INSERT INTO business_density (
                        id, tenant_id, geo_id, country, city, business_type,
                        count, density_score, coordinates, last_updated
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(row.tenant_id.map(|t| t.to_string()))
                .bind(&row.geo_id)
                .bind(&row.country)
                .bind(&row.city)
                .bind(&row.business_type)
                .bind(row.count)
                .bind(row.density_score)
                .bind(json_text(&row.coordinates))
                .bind(&stamp)
                .execute(store.pool())
                .await
                .map_err(|e| db_err("insert business_density", e))?;
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
    ) -> Result<Vec<BusinessDensityRow>> {
        let rows = match country {
            Some(country) => {
                sqlx::query(
                    r#"
                    SELECT tenant_id, geo_id, country, city, business_type,
                           count, density_score, coordinates
                    FROM business_density
                    WHERE city = ?1 AND country = ?2
                    ORDER BY business_type
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
                    SELECT tenant_id, geo_id, country, city, business_type,
                           count, density_score, coordinates
                    FROM business_density
                    WHERE city = ?1
                    ORDER BY business_type
                    "#,
                )
                .bind(city)
                .fetch_all(store.pool())
                .await
            }
        }
        .map_err(|e| db_err("list business_density", e))?;

        rows.into_iter().map(from_row).collect()
    }
}

fn from_row(row: SqliteRow) -> Result<BusinessDensityRow> {
    Ok(BusinessDensityRow {
        tenant_id: parse_uuid(
            row.try_get("tenant_id")
                .map_err(|e| db_err("read business_density", e))?,
        ),
        geo_id: row
            .try_get("geo_id")
            .map_err(|e| db_err("read business_density", e))?,
        country: row
            .try_get("country")
            .map_err(|e| db_err("read business_density", e))?,
        city: row.try_get("city").map_err(|e| db_err("read business_density", e))?,
        business_type: row
            .try_get("business_type")
            .map_err(|e| db_err("read business_density", e))?,
        count: row.try_get("count").map_err(|e| db_err("read business_density", e))?,
        density_score: row
            .try_get("density_score")
            .map_err(|e| db_err("read business_density", e))?,
        coordinates: parse_json(
            row.try_get("coordinates")
                .map_err(|e| db_err("read business_density", e))?,
        ),
    })
}
