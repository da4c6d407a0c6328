//! Data access for the `vector_insights` table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use etl_core::{Result, VectorInsight};

use crate::demographics::{json_text, parse_json, parse_uuid};
use crate::store::{db_err, Store};
use crate::traits::VectorStore;

/// SQLite repository for vector insight rows.
///
/// Keyed by `(tenant_id, geo_id)` in repository logic; a NULL tenant only
/// ever matches a NULL tenant.
#[derive(Debug, Clone, Default)]
pub struct VectorInsightsRepository;

impl VectorInsightsRepository {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl VectorStore for VectorInsightsRepository {
    async fn upsert_many(
        &self,
        store: &Store,
        rows: &[VectorInsight],
        created_at: DateTime<Utc>,
    ) -> Result<usize> {
        let mut affected = 0usize;
        let stamp = created_at.to_rfc3339();

        for row in rows {
            let tenant_text = row.tenant_id.map(|t| t.to_string());
            let embedding_text =
                serde_json::to_string(&row.embedding).map_err(etl_core::Error::from)?;

            let existing: Option<String> = match &tenant_text {
                Some(tenant) => {
                    sqlx::query_scalar(
                        "SELECT id FROM vector_insights WHERE geo_id = ?1 AND tenant_id = ?2",
                    )
                    .bind(&row.geo_id)
                    .bind(tenant)
                    .fetch_optional(store.pool())
                    .await
                }
                None => {
                    sqlx::query_scalar(
                        "SELECT id FROM vector_insights WHERE geo_id = ?1 AND tenant_id IS NULL",
                    )
                    .bind(&row.geo_id)
                    .fetch_optional(store.pool())
                    .await
                }
            }
            .map_err(|e| db_err("select vector_insight", e))?;

            if let Some(id) = existing {
                sqlx::query(
                    r#"
                    UPDATE vector_insights SET embedding = ?1, metadata = ?2, created_at = ?3
                    WHERE id = ?4
                    "#,
                )
                .bind(&embedding_text)
                .bind(json_text(&row.metadata))
                .bind(&stamp)
                .bind(&id)
                .execute(store.pool())
                .await
                .map_err(|e| db_err("update vector_insight", e))?;
            } else {
                sqlx::query(
                    r#"
                    INSERT INTO vector_insights (
                        id, tenant_id, geo_id, embedding, metadata, created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                )
                .bind(Uuid::new_v4().to_string())
                .bind(&tenant_text)
                .bind(&row.geo_id)
                .bind(&embedding_text)
                .bind(json_text(&row.metadata))
                .bind(&stamp)
                .execute(store.pool())
                .await
                .map_err(|e| db_err("insert vector_insight", e))?;
            }

            affected += 1;
        }

        Ok(affected)
    }

    async fn list_by_geo_ids(
        &self,
        store: &Store,
        geo_ids: &[String],
        tenant_id: Option<Uuid>,
    ) -> Result<Vec<VectorInsight>> {
        // SQLite has no array binds; geo_ids stay small (sub-city regions),
        // so fetch per id and keep the input order.
        let mut out = Vec::new();

        for geo_id in geo_ids {
            let row = match tenant_id {
                Some(tenant) => {
                    sqlx::query(
                        r#"
                        SELECT tenant_id, geo_id, embedding, metadata
                        FROM vector_insights
                        WHERE geo_id = ?1 AND tenant_id = ?2
                        "#,
                    )
                    .bind(geo_id)
                    .bind(tenant.to_string())
                    .fetch_optional(store.pool())
                    .await
                }
                None => {
                    sqlx::query(
                        r#"
                        SELECT tenant_id, geo_id, embedding, metadata
                        FROM vector_insights
                        WHERE geo_id = ?1 AND tenant_id IS NULL
                        "#,
                    )
                    .bind(geo_id)
                    .fetch_optional(store.pool())
                    .await
                }
            }
            .map_err(|e| db_err("list vector_insights", e))?;

            if let Some(row) = row {
                out.push(from_row(row)?);
            }
        }

        Ok(out)
    }
}

fn from_row(row: SqliteRow) -> Result<VectorInsight> {
    let embedding_text: String = row
        .try_get("embedding")
        .map_err(|e| db_err("read vector_insight", e))?;

    Ok(VectorInsight {
        tenant_id: parse_uuid(
            row.try_get("tenant_id")
                .map_err(|e| db_err("read vector_insight", e))?,
        ),
        geo_id: row
            .try_get("geo_id")
            .map_err(|e| db_err("read vector_insight", e))?,
        embedding: serde_json::from_str(&embedding_text).map_err(etl_core::Error::from)?,
        metadata: parse_json(
            row.try_get("metadata")
                .map_err(|e| db_err("read vector_insight", e))?,
        ),
    })
}
