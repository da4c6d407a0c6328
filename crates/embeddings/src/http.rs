//! OpenAI-style HTTP embedding client.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use etl_core::{Error, Result};

use crate::config::EmbeddingConfig;
use crate::EmbeddingClient;

/// Calls `POST {base_url}/embeddings` with the whole document batch.
pub struct HttpEmbeddingClient {
    config: EmbeddingConfig,
    http_client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    embedding: Vec<f32>,
}

impl HttpEmbeddingClient {
    pub fn new(config: EmbeddingConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::source_fetch(format!("http client build failed: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl EmbeddingClient for HttpEmbeddingClient {
    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        info!(
            model = %self.config.model,
            text_count = texts.len(),
            dimensions = self.config.dimensions,
            "Generating embeddings"
        );

        let url = format!("{}/embeddings", self.config.base_url);
        let mut request = self.http_client.post(&url).json(&json!({
            "model": self.config.model,
            "input": texts,
            "dimensions": self.config.dimensions,
        }));
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::source_fetch(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::source_fetch(format!(
                "embedding provider returned {}",
                response.status()
            )));
        }

        let body: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| Error::source_fetch(format!("embedding response malformed: {e}")))?;

        Ok(body.data.into_iter().map(|item| item.embedding).collect())
    }
}
