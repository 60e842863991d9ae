//! Axum route handlers for the chat endpoints.
//!
//! Each request walks a flat decision list: validate, short-circuit canned
//! answers, otherwise run the pipeline. Pipeline failures never surface as
//! HTTP errors; they become a `status = "error"` body with the fallback
//! answer.

use axum::{extract::State, Json};
use tracing::error;
use uuid::Uuid;

use crate::chat::agent::run_agent_chain;
use crate::chat::models::{QueryRequest, QueryResponse};
use crate::chat::pipeline::{run_query_chain, ChainOutcome};
use crate::chat::prompts;
use crate::chat::telemetry::log_telemetry;
use crate::errors::AppError;
use crate::state::AppState;

const GREETINGS: [&str; 3] = ["hi", "hello", "hey"];

/// Canned answers that bypass the pipeline entirely.
fn short_circuit(query: &str) -> Option<&'static str> {
    let lowered = query.to_lowercase();
    if GREETINGS.contains(&lowered.as_str()) {
        return Some(prompts::GREETING_RESPONSE);
    }
    if lowered.contains("other recommendations") || lowered.contains("already familiar") {
        return Some(prompts::ALTERNATIVE_RESOURCES);
    }
    None
}

/// POST /query
///
/// Direct retrieval chain. Empty queries are rejected with 400 before any
/// pipeline work; anything the pipeline cannot answer degrades to the fixed
/// fallback string.
pub async fn handle_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Query cannot be empty".to_string()));
    }

    let session_id = Uuid::new_v4();

    if let Some(canned) = short_circuit(query) {
        log_telemetry(session_id, query, canned);
        return Ok(Json(QueryResponse::success(canned)));
    }

    match run_query_chain(&state, session_id, query).await {
        Ok(ChainOutcome::Answered(answer)) => Ok(Json(QueryResponse::success(answer))),
        Ok(ChainOutcome::NoData) => Ok(Json(QueryResponse::success(
            prompts::NO_INFORMATION_FALLBACK,
        ))),
        Err(e) => {
            error!("Query processing failed: {e}");
            Ok(Json(QueryResponse::error(
                prompts::NO_INFORMATION_FALLBACK,
                e.to_string(),
            )))
        }
    }
}

/// POST /agent-query
///
/// Same request/response shapes, routed through the agentic sequential
/// chain. Only the empty-query check short-circuits here.
pub async fn handle_agent_query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError> {
    let query = request.query.trim();
    if query.is_empty() {
        return Err(AppError::Validation("Query cannot be empty".to_string()));
    }

    let session_id = Uuid::new_v4();

    match run_agent_chain(&state, session_id, query).await {
        Ok(answer) => Ok(Json(QueryResponse::success(answer))),
        Err(e) => {
            error!("Agentic query failed: {e}");
            Ok(Json(QueryResponse::error(
                prompts::NO_INFORMATION_FALLBACK,
                e.to_string(),
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::models::QueryStatus;
    use crate::config::Config;
    use crate::ingest::chunker::Chunk;
    use crate::llm_client::{CompletionModel, LlmError};
    use crate::retrieval::embeddings::{Embedder, EmbeddingError};
    use crate::retrieval::{Retriever, VectorIndex};
    use crate::routes::build_router;

    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    struct FixedEmbedder {
        vectors: HashMap<String, Vec<f32>>,
        fallback: Vec<f32>,
    }

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|t| {
                    self.vectors
                        .get(t)
                        .cloned()
                        .unwrap_or_else(|| self.fallback.clone())
                })
                .collect())
        }
    }

    struct FailingEmbedder;

    #[async_trait]
    impl Embedder for FailingEmbedder {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::Api {
                status: 503,
                message: "embedding backend unavailable".to_string(),
            })
        }
    }

    struct StubLlm {
        answer: String,
    }

    #[async_trait]
    impl CompletionModel for StubLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.answer.clone())
        }
    }

    struct FailingLlm;

    #[async_trait]
    impl CompletionModel for FailingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Api {
                status: 500,
                message: "completion backend down".to_string(),
            })
        }
    }

    fn test_config(index_dir: &std::path::Path) -> Config {
        Config {
            adzuna_app_id: "test-app".to_string(),
            adzuna_api_key: "test-key".to_string(),
            openai_api_key: "sk-test".to_string(),
            allowed_origin: "http://localhost:3000".to_string(),
            index_dir: index_dir.to_path_buf(),
            port: 8000,
            rust_log: "info".to_string(),
        }
    }

    fn chunk(text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            metadata: std::collections::BTreeMap::new(),
            start_offset: 0,
        }
    }

    /// State with one indexed chunk. `query_vector` controls whether user
    /// queries land on it ([1,0] hits, [0,1] misses).
    async fn test_state(
        index_dir: &std::path::Path,
        query_vector: Vec<f32>,
        llm: Arc<dyn CompletionModel>,
    ) -> AppState {
        let embedder: Arc<dyn Embedder> = Arc::new(FixedEmbedder {
            vectors: [("indexed career advice".to_string(), vec![1.0, 0.0])]
                .into_iter()
                .collect(),
            fallback: query_vector,
        });
        let index = VectorIndex::build(
            vec![chunk("indexed career advice")],
            embedder.as_ref(),
            index_dir,
        )
        .await
        .unwrap();

        AppState {
            retriever: Arc::new(Retriever::new(index, embedder)),
            llm,
            config: test_config(index_dir),
        }
    }

    async fn failing_retrieval_state(index_dir: &std::path::Path) -> AppState {
        let build_embedder: Arc<dyn Embedder> = Arc::new(FixedEmbedder {
            vectors: HashMap::new(),
            fallback: vec![1.0, 0.0],
        });
        let index = VectorIndex::build(
            vec![chunk("indexed career advice")],
            build_embedder.as_ref(),
            index_dir,
        )
        .await
        .unwrap();

        AppState {
            retriever: Arc::new(Retriever::new(index, Arc::new(FailingEmbedder))),
            llm: Arc::new(StubLlm {
                answer: "unused".to_string(),
            }),
            config: test_config(index_dir),
        }
    }

    async fn post_json(state: AppState, uri: &str, body: serde_json::Value) -> (StatusCode, Body) {
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        (response.status(), response.into_body())
    }

    async fn read_response(body: Body) -> QueryResponse {
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_short_circuit_matches_exact_greetings_only() {
        assert_eq!(short_circuit("hello"), Some(prompts::GREETING_RESPONSE));
        assert_eq!(short_circuit("HEY"), Some(prompts::GREETING_RESPONSE));
        assert_eq!(short_circuit("hello there"), None);
    }

    #[test]
    fn test_short_circuit_matches_alternative_resource_phrases() {
        assert_eq!(
            short_circuit("any other recommendations?"),
            Some(prompts::ALTERNATIVE_RESOURCES)
        );
        assert_eq!(
            short_circuit("I'm already familiar with Coursera"),
            Some(prompts::ALTERNATIVE_RESOURCES)
        );
    }

    #[tokio::test]
    async fn test_query_greeting_returns_canned_response() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![1.0, 0.0],
            Arc::new(StubLlm {
                answer: "unused".to_string(),
            }),
        )
        .await;

        let (status, body) = post_json(state, "/query", serde_json::json!({"query": "hello"})).await;

        assert_eq!(status, StatusCode::OK);
        let response = read_response(body).await;
        assert_eq!(
            response.answer,
            "Hello! How can I assist you with your career goals today?"
        );
        assert_eq!(response.status, QueryStatus::Success);
        assert_eq!(response.error, None);
    }

    #[tokio::test]
    async fn test_query_empty_returns_400() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![1.0, 0.0],
            Arc::new(StubLlm {
                answer: "unused".to_string(),
            }),
        )
        .await;

        let (status, _) = post_json(state, "/query", serde_json::json!({"query": ""})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_whitespace_only_returns_400() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![1.0, 0.0],
            Arc::new(StubLlm {
                answer: "unused".to_string(),
            }),
        )
        .await;

        let (status, _) = post_json(state, "/query", serde_json::json!({"query": "   "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_other_recommendations_returns_alternatives() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![1.0, 0.0],
            Arc::new(StubLlm {
                answer: "unused".to_string(),
            }),
        )
        .await;

        let (status, body) = post_json(
            state,
            "/query",
            serde_json::json!({"query": "other recommendations"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response = read_response(body).await;
        assert_eq!(response.answer, prompts::ALTERNATIVE_RESOURCES);
        assert_eq!(response.status, QueryStatus::Success);
    }

    #[tokio::test]
    async fn test_query_returns_generated_answer() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![1.0, 0.0],
            Arc::new(StubLlm {
                answer: "Focus on Python and SQL.".to_string(),
            }),
        )
        .await;

        let (status, body) = post_json(
            state,
            "/query",
            serde_json::json!({"query": "what skills do I need?"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response = read_response(body).await;
        assert_eq!(response.answer, "Focus on Python and SQL.");
        assert_eq!(response.status, QueryStatus::Success);
    }

    #[tokio::test]
    async fn test_query_falls_back_when_nothing_clears_threshold() {
        let dir = tempfile::tempdir().unwrap();
        // Query vector orthogonal to the indexed chunk: no hits.
        let state = test_state(
            dir.path(),
            vec![0.0, 1.0],
            Arc::new(StubLlm {
                answer: "unused".to_string(),
            }),
        )
        .await;

        let (status, body) = post_json(
            state,
            "/query",
            serde_json::json!({"query": "something unrelated"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response = read_response(body).await;
        assert_eq!(response.answer, prompts::NO_INFORMATION_FALLBACK);
        assert_eq!(response.status, QueryStatus::Success);
    }

    #[tokio::test]
    async fn test_query_retrieval_failure_returns_error_status_with_body() {
        let dir = tempfile::tempdir().unwrap();
        let state = failing_retrieval_state(dir.path()).await;

        let (status, body) = post_json(
            state,
            "/query",
            serde_json::json!({"query": "what skills do I need?"}),
        )
        .await;

        // Never a bodyless 5xx: the failure is folded into the response body.
        assert_eq!(status, StatusCode::OK);
        let response = read_response(body).await;
        assert_eq!(response.answer, prompts::NO_INFORMATION_FALLBACK);
        assert_eq!(response.status, QueryStatus::Error);
        assert!(response.error.unwrap().contains("embedding"));
    }

    #[tokio::test]
    async fn test_query_completion_failure_returns_error_status() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), vec![1.0, 0.0], Arc::new(FailingLlm)).await;

        let (status, body) = post_json(
            state,
            "/query",
            serde_json::json!({"query": "what skills do I need?"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response = read_response(body).await;
        assert_eq!(response.answer, prompts::NO_INFORMATION_FALLBACK);
        assert_eq!(response.status, QueryStatus::Error);
        assert!(response.error.unwrap().contains("completion"));
    }

    #[tokio::test]
    async fn test_query_normalizes_no_relevant_information_answer() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![1.0, 0.0],
            Arc::new(StubLlm {
                answer: "I found no relevant information in the context.".to_string(),
            }),
        )
        .await;

        let (_, body) = post_json(
            state,
            "/query",
            serde_json::json!({"query": "what skills do I need?"}),
        )
        .await;

        let response = read_response(body).await;
        assert_eq!(response.answer, prompts::NO_INFORMATION_FALLBACK);
        assert_eq!(response.status, QueryStatus::Success);
    }

    #[tokio::test]
    async fn test_agent_query_applies_guardrail() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![1.0, 0.0],
            Arc::new(StubLlm {
                answer: "You could hack your way in.".to_string(),
            }),
        )
        .await;

        let (status, body) = post_json(
            state,
            "/agent-query",
            serde_json::json!({"query": "how do I get hired fast?"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response = read_response(body).await;
        assert_eq!(response.answer, prompts::UNSAFE_TOPIC_REFUSAL);
        assert_eq!(response.status, QueryStatus::Success);
    }

    #[tokio::test]
    async fn test_agent_query_empty_returns_400() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![1.0, 0.0],
            Arc::new(StubLlm {
                answer: "unused".to_string(),
            }),
        )
        .await;

        let (status, _) = post_json(state, "/agent-query", serde_json::json!({"query": " "})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_agent_query_answers_with_empty_context() {
        let dir = tempfile::tempdir().unwrap();
        // No retrieval hits; the agent chain still calls the model.
        let state = test_state(
            dir.path(),
            vec![0.0, 1.0],
            Arc::new(StubLlm {
                answer: "General advice: keep learning.".to_string(),
            }),
        )
        .await;

        let (_, body) = post_json(
            state,
            "/agent-query",
            serde_json::json!({"query": "something unrelated"}),
        )
        .await;

        let response = read_response(body).await;
        assert_eq!(response.answer, "General advice: keep learning.");
    }

    #[tokio::test]
    async fn test_chat_history_is_accepted_and_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(
            dir.path(),
            vec![1.0, 0.0],
            Arc::new(StubLlm {
                answer: "unused".to_string(),
            }),
        )
        .await;

        let (status, body) = post_json(
            state,
            "/query",
            serde_json::json!({"query": "hi", "chat_history": [{"role": "user", "content": "x"}]}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let response = read_response(body).await;
        assert_eq!(response.answer, prompts::GREETING_RESPONSE);
    }
}
