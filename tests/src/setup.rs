//! Common test setup functions.

use std::collections::HashMap;
use std::sync::Arc;

use axum::Router;

use api::{router, AppState};
use embeddings::StubEmbeddingClient;
use etl_core::{Dataset, EmbeddingJob};
use jobs::{
    BusinessDensityEtlJob, DemographicsEtlJob, EmbeddingHandler, EmbeddingWorker,
    IngestionHandler, IngestionWorker, LabourStatsEtlJob, RebuildEmbeddingsJob, SpendingEtlJob,
};
use market_store::{
    BusinessDensityRepository, DataFreshnessRepository, DemographicsRepository, EtlLogRepository,
    LabourStatsRepository, SpendingRepository, Store, VectorInsightsRepository,
};

use crate::fixtures::density_row;
use crate::mocks::CannedBusinessDensitySource;

/// Vector width used across the suite; small to keep assertions readable.
pub const TEST_DIMENSIONS: usize = 16;

/// Fresh in-memory store with the schema applied.
pub async fn test_store() -> Store {
    let store = Store::in_memory().await.expect("Failed to create store");
    store.init_schema().await.expect("Failed to apply schema");
    store
}

/// Ingestion worker wired like production, with the Overpass client
/// replaced by canned rows so the suite stays offline.
pub fn test_ingestion_worker() -> IngestionWorker {
    let density_source = CannedBusinessDensitySource::new(vec![
        density_row("Accra", "cafes", 42),
        density_row("Accra", "restaurants", 17),
    ]);

    let mut handlers: HashMap<Dataset, Arc<dyn IngestionHandler>> = HashMap::new();
    handlers.insert(
        Dataset::BusinessDensity,
        Arc::new(BusinessDensityEtlJob::new(
            Arc::new(BusinessDensityRepository::new()),
            Arc::new(DataFreshnessRepository::new()),
            Arc::new(EtlLogRepository::new()),
            Arc::new(density_source),
        )),
    );
    handlers.insert(
        Dataset::Demographics,
        Arc::new(DemographicsEtlJob::create_default()),
    );
    handlers.insert(
        Dataset::LabourStats,
        Arc::new(LabourStatsEtlJob::create_default()),
    );
    handlers.insert(Dataset::Spending, Arc::new(SpendingEtlJob::create_default()));

    IngestionWorker::new(handlers)
}

/// Rebuild job against the deterministic stub embedding client.
pub fn test_rebuild_job() -> RebuildEmbeddingsJob {
    RebuildEmbeddingsJob::new(
        Arc::new(DemographicsRepository::new()),
        Arc::new(SpendingRepository::new()),
        Arc::new(LabourStatsRepository::new()),
        Arc::new(BusinessDensityRepository::new()),
        Arc::new(VectorInsightsRepository::new()),
        Arc::new(StubEmbeddingClient::new(TEST_DIMENSIONS)),
        TEST_DIMENSIONS,
    )
}

/// Embedding worker routing to [`test_rebuild_job`].
pub fn test_embedding_worker() -> EmbeddingWorker {
    let mut handlers: HashMap<EmbeddingJob, Arc<dyn EmbeddingHandler>> = HashMap::new();
    handlers.insert(
        EmbeddingJob::RebuildEmbeddings,
        Arc::new(test_rebuild_job()),
    );
    EmbeddingWorker::new(handlers)
}

/// Full router over a fresh store, with offline workers.
pub async fn test_app() -> (Router, Store) {
    let store = test_store().await;
    let state = AppState::new(
        store.clone(),
        Arc::new(test_ingestion_worker()),
        Arc::new(test_embedding_worker()),
    );
    (router(state), store)
}
