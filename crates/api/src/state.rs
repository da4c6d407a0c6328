//! Application state shared across handlers.

use std::sync::Arc;

use jobs::{EmbeddingWorker, IngestionWorker};
use market_store::Store;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Storage handle passed into every dispatch call
    pub store: Store,
    /// Ingestion dispatch worker
    pub ingestion: Arc<IngestionWorker>,
    /// Embedding dispatch worker
    pub embeddings: Arc<EmbeddingWorker>,
}

impl AppState {
    pub fn new(
        store: Store,
        ingestion: Arc<IngestionWorker>,
        embeddings: Arc<EmbeddingWorker>,
    ) -> Self {
        Self {
            store,
            ingestion,
            embeddings,
        }
    }
}
