//! Data access for the `data_freshness` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use etl_core::{DataFreshness, JobStatus, Result};

use crate::store::{db_err, Store};
use crate::traits::FreshnessTracker;

/// SQLite repository for per-dataset freshness records.
#[derive(Debug, Clone, Default)]
pub struct DataFreshnessRepository;

impl DataFreshnessRepository {
    pub fn new() -> Self {
        Self
    }

    /// All freshness records ordered by dataset name; used by admin
    /// listing endpoints.
    pub async fn list_all(&self, store: &Store) -> Result<Vec<DataFreshness>> {
        let rows = sqlx::query(
            r#"
            SELECT dataset_name, last_run, row_count, status
            FROM data_freshness
            ORDER BY dataset_name ASC
            "#,
        )
        .fetch_all(store.pool())
        .await
        .map_err(|e| db_err("list data_freshness", e))?;

        rows.into_iter().map(from_row).collect()
    }

    /// Freshness record for one dataset, if it has ever run.
    pub async fn get(&self, store: &Store, dataset_name: &str) -> Result<Option<DataFreshness>> {
        let row = sqlx::query(
            r#"
            SELECT dataset_name, last_run, row_count, status
            FROM data_freshness
            WHERE dataset_name = ?1
            "#,
        )
        .bind(dataset_name)
        .fetch_optional(store.pool())
        .await
        .map_err(|e| db_err("get data_freshness", e))?;

        row.map(from_row).transpose()
    }
}

#[async_trait]
impl FreshnessTracker for DataFreshnessRepository {
    async fn upsert_status(
        &self,
        store: &Store,
        dataset_name: &str,
        last_run: DateTime<Utc>,
        row_count: i64,
        status: JobStatus,
    ) -> Result<DataFreshness> {
        let stamp = last_run.to_rfc3339();

        let existing: Option<String> =
            sqlx::query_scalar("SELECT id FROM data_freshness WHERE dataset_name = ?1")
                .bind(dataset_name)
                .fetch_optional(store.pool())
                .await
                .map_err(|e| db_err("select data_freshness", e))?;

        if let Some(id) = existing {
            sqlx::query(
                r#"
                UPDATE data_freshness SET last_run = ?1, row_count = ?2, status = ?3
                WHERE id = ?4
                "#,
            )
            .bind(&stamp)
            .bind(row_count)
            .bind(status.as_str())
            .bind(&id)
            .execute(store.pool())
            .await
            .map_err(|e| db_err("update data_freshness", e))?;
        } else {
            sqlx::query(
                r#"
                INSERT INTO data_freshness (id, dataset_name, last_run, row_count, status)
                VALUES (?1, ?2, ?3, ?4, ?5)
                "#,
            )
            .bind(Uuid::new_v4().to_string())
            .bind(dataset_name)
            .bind(&stamp)
            .bind(row_count)
            .bind(status.as_str())
            .execute(store.pool())
            .await
            .map_err(|e| db_err("insert data_freshness", e))?;
        }

        Ok(DataFreshness {
            dataset_name: dataset_name.to_string(),
            last_run: stamp,
            row_count,
            status: status.as_str().to_string(),
        })
    }
}

fn from_row(row: SqliteRow) -> Result<DataFreshness> {
    Ok(DataFreshness {
        dataset_name: row
            .try_get("dataset_name")
            .map_err(|e| db_err("read data_freshness", e))?,
        last_run: row
            .try_get::<Option<String>, _>("last_run")
            .map_err(|e| db_err("read data_freshness", e))?
            .unwrap_or_default(),
        row_count: row
            .try_get::<Option<i64>, _>("row_count")
            .map_err(|e| db_err("read data_freshness", e))?
            .unwrap_or_default(),
        status: row
            .try_get::<Option<String>, _>("status")
            .map_err(|e| db_err("read data_freshness", e))?
            .unwrap_or_default(),
    })
}
