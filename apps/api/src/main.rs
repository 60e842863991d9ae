mod chat;
mod config;
mod errors;
mod ingest;
mod llm_client;
mod retrieval;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{header, HeaderValue, Method};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::ingest::chunker::{split_documents, ChunkConfig};
use crate::ingest::fetcher::{JobFetcher, MAX_DOCUMENTS};
use crate::llm_client::{CompletionModel, OpenAiClient};
use crate::retrieval::embeddings::{Embedder, OpenAiEmbedder};
use crate::retrieval::{Retriever, VectorIndex};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={},telemetry=info",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting SkillBridge API v{}", env!("CARGO_PKG_VERSION"));

    // Fetch job-market documents. An empty result is a degraded start, not a
    // failure; the index falls back to a placeholder chunk.
    let fetcher = JobFetcher::new(&config);
    let documents = fetcher.fetch_career_data(MAX_DOCUMENTS).await;
    if documents.is_empty() {
        warn!("No career data retrieved; relying on LLM fallback");
    }

    let chunks = split_documents(&documents, &ChunkConfig::default());
    info!("Chunked {} documents into {} chunks", documents.len(), chunks.len());

    // Build the vector index. Failure here is fatal: the service cannot
    // answer without an index.
    let embedder: Arc<dyn Embedder> = Arc::new(OpenAiEmbedder::new(config.openai_api_key.clone()));
    let index = VectorIndex::build(chunks, embedder.as_ref(), &config.index_dir)
        .await
        .context("Failed to build vector index")?;
    let retriever = Arc::new(Retriever::new(index, embedder));

    // Initialize LLM client
    let llm: Arc<dyn CompletionModel> = Arc::new(OpenAiClient::new(config.openai_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Build app state
    let state = AppState {
        retriever,
        llm,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config)?);

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// CORS restricted to the single configured origin, POST/GET/OPTIONS, and
/// the two headers the frontend sends.
fn cors_layer(config: &Config) -> Result<CorsLayer> {
    let origin: HeaderValue = config
        .allowed_origin
        .parse()
        .context("ALLOWED_ORIGIN is not a valid header value")?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true))
}
