use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::CompletionModel;
use crate::retrieval::Retriever;

/// Shared application state injected into all route handlers via Axum
/// extractors. Constructed once at startup; the index behind the retriever
/// and the client handles are immutable for the process lifetime.
#[derive(Clone)]
pub struct AppState {
    pub retriever: Arc<Retriever>,
    /// Pluggable completion model. Production uses `OpenAiClient`; tests
    /// inject doubles.
    pub llm: Arc<dyn CompletionModel>,
    /// Runtime settings, kept for handlers that grow per-request knobs.
    #[allow(dead_code)]
    pub config: Config,
}
