//! Embedding provider client.
//!
//! The HTTP client speaks an OpenAI-style embeddings API; the stub
//! produces deterministic vectors for tests and local/dev runs without an
//! API key. Both sit behind the same trait so the rebuild job never knows
//! which one it holds.

pub mod config;
pub mod http;
pub mod stub;

use async_trait::async_trait;

use etl_core::Result;

pub use config::EmbeddingConfig;
pub use http::HttpEmbeddingClient;
pub use stub::StubEmbeddingClient;

/// Batch embedding seam.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// One vector per input text, in input order.
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}
