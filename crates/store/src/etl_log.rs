//! Data access for the append-only `etl_logs` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use etl_core::{Error, EtlLogEntry, JobStatus, Result};

use crate::store::{db_err, Store};
use crate::traits::AuditLogger;

/// SQLite repository for audit log entries. The pipeline only ever
/// appends; entries are never updated or deleted.
#[derive(Debug, Clone, Default)]
pub struct EtlLogRepository;

impl EtlLogRepository {
    pub fn new() -> Self {
        Self
    }

    /// Most recent entries, optionally filtered by job name; used by admin
    /// listing endpoints and tests.
    pub async fn list_recent(
        &self,
        store: &Store,
        job_name: Option<&str>,
        limit: u32,
    ) -> Result<Vec<EtlLogEntry>> {
        let rows = match job_name {
            Some(job_name) => {
                sqlx::query(
                    r#"
                    SELECT id, job_name, payload, status, created_at
                    FROM etl_logs
                    WHERE job_name = ?1
                    ORDER BY created_at DESC
                    LIMIT ?2
                    "#,
                )
                .bind(job_name)
                .bind(limit)
                .fetch_all(store.pool())
                .await
            }
            None => {
                sqlx::query(
                    r#"
                    SELECT id, job_name, payload, status, created_at
                    FROM etl_logs
                    ORDER BY created_at DESC
                    LIMIT ?1
                    "#,
                )
                .bind(limit)
                .fetch_all(store.pool())
                .await
            }
        }
        .map_err(|e| db_err("list etl_logs", e))?;

        rows.into_iter().map(from_row).collect()
    }
}

#[async_trait]
impl AuditLogger for EtlLogRepository {
    async fn append(
        &self,
        store: &Store,
        job_name: &str,
        payload: Value,
        status: JobStatus,
        created_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO etl_logs (id, job_name, payload, status, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(job_name)
        .bind(payload.to_string())
        .bind(status.as_str())
        .bind(created_at.to_rfc3339())
        .execute(store.pool())
        .await
        .map_err(|e| db_err("insert etl_log", e))?;

        Ok(())
    }
}

fn from_row(row: SqliteRow) -> Result<EtlLogEntry> {
    let id: String = row.try_get("id").map_err(|e| db_err("read etl_log", e))?;
    let payload: Option<String> = row.try_get("payload").map_err(|e| db_err("read etl_log", e))?;

    Ok(EtlLogEntry {
        id: Uuid::parse_str(&id).map_err(|e| Error::persistence(format!("bad etl_log id: {e}")))?,
        job_name: row.try_get("job_name").map_err(|e| db_err("read etl_log", e))?,
        payload: payload
            .and_then(|p| serde_json::from_str(&p).ok())
            .unwrap_or(Value::Null),
        status: row
            .try_get::<Option<String>, _>("status")
            .map_err(|e| db_err("read etl_log", e))?
            .unwrap_or_default(),
        created_at: row
            .try_get::<Option<String>, _>("created_at")
            .map_err(|e| db_err("read etl_log", e))?
            .unwrap_or_default(),
    })
}
