//! Embeddings rebuild job.
//!
//! Assembles one canonical snapshot document per region from the four
//! dataset tables, embeds the batch, validates vector width, and upserts
//! the vector store. Region ordering is lexicographic and load-bearing:
//! it fixes the embedding-to-row correspondence across runs.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tracing::{error, info};
use uuid::Uuid;

use embeddings::{
    EmbeddingClient, EmbeddingConfig, HttpEmbeddingClient, StubEmbeddingClient,
};
use etl_core::{
    BusinessDensityRow, DemographicsRow, EmbeddingJob, Error, JobStatus, LabourStatsRow,
    RebuildEmbeddingsSummary, Result, SpendingRow, VectorInsight,
};
use market_store::{
    AuditLogger, BusinessDensityRepository, BusinessDensityStore, DemographicsRepository,
    DemographicsStore, EtlLogRepository, LabourStatsRepository, LabourStatsStore,
    SpendingRepository, SpendingStore, Store, VectorInsightsRepository, VectorStore,
};

/// Job that rebuilds the per-region vector insights for a city.
pub struct RebuildEmbeddingsJob {
    demographics: Arc<dyn DemographicsStore>,
    spending: Arc<dyn SpendingStore>,
    labour_stats: Arc<dyn LabourStatsStore>,
    business_density: Arc<dyn BusinessDensityStore>,
    vectors: Arc<dyn VectorStore>,
    embedding_client: Arc<dyn EmbeddingClient>,
    dimensions: usize,
}

impl RebuildEmbeddingsJob {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        demographics: Arc<dyn DemographicsStore>,
        spending: Arc<dyn SpendingStore>,
        labour_stats: Arc<dyn LabourStatsStore>,
        business_density: Arc<dyn BusinessDensityStore>,
        vectors: Arc<dyn VectorStore>,
        embedding_client: Arc<dyn EmbeddingClient>,
        dimensions: usize,
    ) -> Self {
        Self {
            demographics,
            spending,
            labour_stats,
            business_density,
            vectors,
            embedding_client,
            dimensions,
        }
    }

    /// Default wiring: SQLite repositories and the HTTP embedding client
    /// when an API key is configured, the deterministic stub otherwise.
    pub fn create_default(embedding_config: &EmbeddingConfig) -> Result<Self> {
        let embedding_client: Arc<dyn EmbeddingClient> = if embedding_config.api_key.is_some() {
            Arc::new(HttpEmbeddingClient::new(embedding_config.clone())?)
        } else {
            Arc::new(StubEmbeddingClient::new(embedding_config.dimensions))
        };

        Ok(Self::new(
            Arc::new(DemographicsRepository::new()),
            Arc::new(SpendingRepository::new()),
            Arc::new(LabourStatsRepository::new()),
            Arc::new(BusinessDensityRepository::new()),
            Arc::new(VectorInsightsRepository::new()),
            embedding_client,
            embedding_config.dimensions,
        ))
    }

    /// Execute one embeddings rebuild.
    ///
    /// Fails fast when `city` is missing; precondition failures happen
    /// before any side effect and leave no audit entry.
    pub async fn run(
        &self,
        store: &Store,
        country: Option<&str>,
        city: Option<&str>,
        regions: Option<&[String]>,
        options: &Map<String, Value>,
        tenant_id: Option<Uuid>,
    ) -> Result<RebuildEmbeddingsSummary> {
        let job_name = EmbeddingJob::RebuildEmbeddings.name();
        let now = Utc::now();

        let city = city
            .filter(|c| !c.is_empty())
            .ok_or_else(|| Error::validation("city is required for rebuild-embeddings"))?;

        info!(
            job_name = %job_name,
            country = country.unwrap_or("-"),
            city = %city,
            region_count = regions.map(<[String]>::len),
            "Starting embeddings rebuild"
        );

        match self
            .execute(store, country, city, regions, options, tenant_id, now)
            .await
        {
            Ok((affected, region_count)) => {
                info!(
                    job_name = %job_name,
                    row_count = affected,
                    region_count = region_count,
                    "Embeddings rebuild completed"
                );
                Ok(RebuildEmbeddingsSummary {
                    job_name: job_name.to_string(),
                    status: JobStatus::Completed,
                    row_count: affected as u64,
                    country: country.map(str::to_owned),
                    city: Some(city.to_string()),
                    region_count: region_count as u64,
                })
            }
            Err(err) => {
                error!(
                    job_name = %job_name,
                    error = %err,
                    "Embeddings rebuild failed"
                );
                EtlLogRepository::new()
                    .append(
                        store,
                        job_name,
                        rebuild_payload(country, Some(city), regions, options),
                        JobStatus::Failed,
                        now,
                    )
                    .await?;
                Err(err)
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute(
        &self,
        store: &Store,
        country: Option<&str>,
        city: &str,
        regions: Option<&[String]>,
        options: &Map<String, Value>,
        tenant_id: Option<Uuid>,
        now: DateTime<Utc>,
    ) -> Result<(usize, usize)> {
        let job_name = EmbeddingJob::RebuildEmbeddings.name();

        let demographics_rows = self.demographics.list_for_city(store, city, country).await?;
        let spending_rows = self.spending.list_for_city(store, city, country).await?;
        let labour_rows = self.labour_stats.list_for_city(store, city, country).await?;
        let density_rows = self
            .business_density
            .list_for_city(store, city, country)
            .await?;

        // Union of geo_ids across the four datasets, optionally narrowed,
        // in lexicographic order.
        let mut geo_ids: BTreeSet<String> = BTreeSet::new();
        geo_ids.extend(demographics_rows.iter().map(|r| r.geo_id.clone()));
        geo_ids.extend(spending_rows.iter().map(|r| r.geo_id.clone()));
        geo_ids.extend(labour_rows.iter().map(|r| r.geo_id.clone()));
        geo_ids.extend(density_rows.iter().map(|r| r.geo_id.clone()));

        let ordered_geo_ids: Vec<String> = match regions {
            Some(filter) => geo_ids
                .into_iter()
                .filter(|geo_id| filter.contains(geo_id))
                .collect(),
            None => geo_ids.into_iter().collect(),
        };

        let mut documents = Vec::with_capacity(ordered_geo_ids.len());
        let mut metadatas = Vec::with_capacity(ordered_geo_ids.len());
        for geo_id in &ordered_geo_ids {
            documents.push(build_region_document(
                geo_id,
                city,
                country,
                &demographics_rows,
                &spending_rows,
                &labour_rows,
                &density_rows,
                options,
            ));
            metadatas.push(json!({
                "geo_id": geo_id,
                "city": city,
                "country": country,
                "options": options,
            }));
        }

        let vectors = self.embedding_client.embed_texts(&documents).await?;
        for vector in &vectors {
            if vector.len() != self.dimensions {
                return Err(Error::DimensionMismatch {
                    expected: self.dimensions,
                    actual: vector.len(),
                });
            }
        }

        let upsert_rows: Vec<VectorInsight> = ordered_geo_ids
            .iter()
            .zip(vectors)
            .zip(metadatas)
            .map(|((geo_id, embedding), metadata)| VectorInsight {
                tenant_id,
                geo_id: geo_id.clone(),
                embedding,
                metadata: Some(metadata),
            })
            .collect();

        let affected = self.vectors.upsert_many(store, &upsert_rows, now).await?;

        EtlLogRepository::new()
            .append(
                store,
                job_name,
                rebuild_payload(country, Some(city), regions, options),
                JobStatus::Completed,
                now,
            )
            .await?;

        Ok((affected, ordered_geo_ids.len()))
    }
}

fn rebuild_payload(
    country: Option<&str>,
    city: Option<&str>,
    regions: Option<&[String]>,
    options: &Map<String, Value>,
) -> Value {
    json!({
        "country": country,
        "city": city,
        "regions": regions,
        "options": options,
    })
}

/// Canonical snapshot for one region: sorted keys, compact separators,
/// decimal fields stringified so identical inputs serialize byte-identically.
#[allow(clippy::too_many_arguments)]
fn build_region_document(
    geo_id: &str,
    city: &str,
    country: Option<&str>,
    demographics_rows: &[DemographicsRow],
    spending_rows: &[SpendingRow],
    labour_rows: &[LabourStatsRow],
    density_rows: &[BusinessDensityRow],
    options: &Map<String, Value>,
) -> String {
    let demographics = demographics_rows.iter().find(|r| r.geo_id == geo_id);
    let labour = labour_rows.iter().find(|r| r.geo_id == geo_id);
    let spending_for_geo: Vec<&SpendingRow> =
        spending_rows.iter().filter(|r| r.geo_id == geo_id).collect();
    let density_for_geo: Vec<&BusinessDensityRow> =
        density_rows.iter().filter(|r| r.geo_id == geo_id).collect();

    let snapshot = json!({
        "geo_id": geo_id,
        "city": city,
        "country": country,
        "demographics": demographics.map(|row| json!({
            "population_total": row.population_total,
            "median_income": stringify_decimal(row.median_income),
        })),
        "labour_stats": labour.map(|row| json!({
            "unemployment_rate": stringify_decimal(row.unemployment_rate),
            "median_salary": stringify_decimal(row.median_salary),
            "job_openings": row.job_openings,
        })),
        "spending": spending_for_geo.iter().map(|row| json!({
            "category": row.category,
            "avg_monthly_spend": stringify_decimal(row.avg_monthly_spend),
            "spend_index": stringify_decimal(row.spend_index),
        })).collect::<Vec<_>>(),
        "business_density": density_for_geo.iter().map(|row| json!({
            "business_type": row.business_type,
            "count": row.count,
            "density_score": stringify_decimal(row.density_score),
        })).collect::<Vec<_>>(),
        "options": options,
    });

    // serde_json objects are key-ordered maps, so this is already the
    // sorted, compact canonical form.
    snapshot.to_string()
}

fn stringify_decimal(value: Option<f64>) -> Option<String> {
    value.map(|v| v.to_string())
}
