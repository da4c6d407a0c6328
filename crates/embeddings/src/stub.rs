//! Deterministic stub embedding client.

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::info;

use etl_core::Result;

use crate::EmbeddingClient;

/// Hash-derived embeddings of a fixed dimension.
///
/// Not semantically meaningful; purely for stable tests and local/dev runs
/// without provider credentials.
#[derive(Debug, Clone)]
pub struct StubEmbeddingClient {
    dimensions: usize,
}

impl StubEmbeddingClient {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    fn stub_embedding(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());
        (0..self.dimensions)
            .map(|idx| {
                let byte = digest[idx % digest.len()];
                // Map 0..255 to -1..1
                (byte as f32 / 127.5) - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingClient for StubEmbeddingClient {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if !texts.is_empty() {
            info!(
                text_count = texts.len(),
                dimensions = self.dimensions,
                "Using deterministic stub embeddings"
            );
        }
        Ok(texts.iter().map(|text| self.stub_embedding(text)).collect())
    }
}
