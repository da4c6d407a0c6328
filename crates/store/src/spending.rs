//! Data access for the `spending` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use etl_core::{Result, SpendingRow};

use crate::demographics::parse_uuid;
use crate::store::{db_err, Store};
use crate::traits::SpendingStore;

/// SQLite repository for spending rows.
#[derive(Debug, Clone, Default)]
pub struct SpendingRepository;

impl SpendingRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SpendingStore for SpendingRepository {
    async fn upsert_many(
        &self,
        store: &Store,
        rows: &[SpendingRow],
        last_updated: DateTime<Utc>,
    ) -> Result<usize> {
        let mut affected = 0usize;
        let stamp = last_updated.to_rfc3339();

        for row in rows {
            let existing: Option<String> = sqlx::query_scalar(
                r#"
                SELECT id FROM spending
                WHERE geo_id = ?1 AND city = ?2 AND country = ?3 AND category = ?4
                "#,
            )
            .bind(&row.geo_id)
            .bind(&row.city)
            .bind(&row.country)
            .bind(&row.category)
            .fetch_optional(store.pool())
            .await
            .map_err(|e| db_err("select spending", e))?;

            if let Some(id) = existing {
                sqlx::query(
                    r#"
                    UPDATE spending SET
                        avg_monthly_spend = ?1,
                        spend_index = ?2,
                        last_updated = ?3
                    WHERE id = ?4
                    "#,
                )
                .bind(row.avg_monthly_spend)
                .bind(row.spend_index)
                .bind(&stamp)
                .bind(&id)
                .execute(store.pool())
                .await
                .map_err(|e| db_err("update spending", e))?;
            } else {
                sqlx::query(
                    r#"
                    INSERT INTO spending (
                        id, tenant_id, geo_id, country, city, category,
                        avg_monthly_spend, spend_index, last_updated
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(row.tenant_id.map(|t| t.to_string()))
                .bind(&row.geo_id)
                .bind(&row.country)
                .bind(&row.city)
                .bind(&row.category)
                .bind(row.avg_monthly_spend)
                .bind(row.spend_index)
                .bind(&stamp)
                .execute(store.pool())
                .await
                .map_err(|e| db_err("insert spending", e))?;
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
    ) -> Result<Vec<SpendingRow>> {
        let rows = match country {
            Some(country) => {
                sqlx::query(
                    r#"
                    SELECT tenant_id, geo_id, country, city, category,
                           avg_monthly_spend, spend_index
                    FROM spending
                    WHERE city = ?1 AND country = ?2
                    ORDER BY geo_id, category
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
                    SELECT tenant_id, geo_id, country, city, category,
                           avg_monthly_spend, spend_index
                    FROM spending
                    WHERE city = ?1
                    ORDER BY geo_id, category
                    "#,
                )
                .bind(city)
                .fetch_all(store.pool())
                .await
            }
        }
        .map_err(|e| db_err("list spending", e))?;

        rows.into_iter().map(from_row).collect()
    }
}

fn from_row(row: SqliteRow) -> Result<SpendingRow> {
    Ok(SpendingRow {
        tenant_id: parse_uuid(row.try_get("tenant_id").map_err(|e| db_err("read spending", e))?),
        geo_id: row.try_get("geo_id").map_err(|e| db_err("read spending", e))?,
        country: row.try_get("country").map_err(|e| db_err("read spending", e))?,
        city: row.try_get("city").map_err(|e| db_err("read spending", e))?,
        category: row.try_get("category").map_err(|e| db_err("read spending", e))?,
        avg_monthly_spend: row
            .try_get("avg_monthly_spend")
            .map_err(|e| db_err("read spending", e))?,
        spend_index: row
            .try_get("spend_index")
            .map_err(|e| db_err("read spending", e))?,
    })
}
