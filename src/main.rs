//! Marketscope ingestion/embedding ETL pipeline
//!
//! Runs the worker push endpoints that feed the dispatchers:
//! - Ingestion worker: dataset ETL jobs with idempotent keyed upserts
//! - Embedding worker: per-region vector rebuilds
//! - Freshness and audit bookkeeping for every run

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::signal;
use tracing::info;

use api::{router, AppState};
use embeddings::EmbeddingConfig;
use jobs::{EmbeddingWorker, IngestionWorker};
use market_store::Store;
use sources::SourceConfig;
use telemetry::init_tracing_from_env;

/// Application configuration.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
struct Config {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,

    #[serde(default = "default_database_url")]
    database_url: String,

    #[serde(default)]
    sources: SourceConfig,

    #[serde(default)]
    embeddings: EmbeddingConfig,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_database_url() -> String {
    "sqlite://marketscope.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            database_url: default_database_url(),
            sources: SourceConfig::default(),
            embeddings: EmbeddingConfig::default(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing
    init_tracing_from_env();

    info!("Starting marketscope pipeline v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = load_config()?;

    info!(
        database_url = %config.database_url,
        overpass_endpoint = %config.sources.overpass_endpoint,
        embedding_model = %config.embeddings.model,
        embedding_dimensions = config.embeddings.dimensions,
        "Loaded configuration"
    );

    // Connect storage and apply schema
    let store = Store::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    store
        .init_schema()
        .await
        .context("Failed to initialize schema")?;

    // Wire the dispatch workers once at startup
    let ingestion = Arc::new(
        IngestionWorker::create_default(&config.sources)
            .context("Failed to build ingestion worker")?,
    );
    let embedding_worker = Arc::new(
        EmbeddingWorker::create_default(&config.embeddings)
            .context("Failed to build embedding worker")?,
    );

    // Create application state and router
    let state = AppState::new(store, ingestion, embedding_worker);
    let app = router(state);

    // Start HTTP server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("Invalid server address")?;

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Shutdown complete");
    Ok(())
}

/// Load configuration from files and environment.
fn load_config() -> Result<Config> {
    let config = config::Config::builder()
        // Start with defaults
        .add_source(config::Config::try_from(&Config::default())?)
        // Load from config file if exists
        .add_source(
            config::File::with_name("config/default")
                .required(false)
                .format(config::FileFormat::Toml),
        )
        // Override with environment variables
        .add_source(
            config::Environment::default()
                .separator("__")
                .prefix("MARKETSCOPE")
                .try_parsing(true),
        )
        .build()
        .context("Failed to build configuration")?;

    let mut config: Config = config
        .try_deserialize()
        .context("Failed to deserialize configuration")?;

    // Manual overrides for the flat, commonly-set values; nested parsing of
    // underscored field names is unreliable in the config crate.
    if let Ok(database_url) = std::env::var("MARKETSCOPE_DATABASE_URL") {
        config.database_url = database_url;
    }
    if let Ok(endpoint) = std::env::var("MARKETSCOPE_OVERPASS_ENDPOINT") {
        config.sources.overpass_endpoint = endpoint;
    }
    if let Ok(api_key) = std::env::var("MARKETSCOPE_EMBEDDING_API_KEY") {
        config.embeddings.api_key = Some(api_key);
    }
    if let Ok(model) = std::env::var("MARKETSCOPE_EMBEDDING_MODEL") {
        config.embeddings.model = model;
    }
    if let Ok(dimensions) = std::env::var("MARKETSCOPE_EMBEDDING_DIMENSIONS") {
        config.embeddings.dimensions = dimensions
            .parse()
            .context("MARKETSCOPE_EMBEDDING_DIMENSIONS must be an integer")?;
    }

    Ok(config)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received terminate signal");
        }
    }
}
