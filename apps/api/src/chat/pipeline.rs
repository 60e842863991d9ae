//! Direct RAG chain: retrieve → prompt → generate → guardrail → telemetry.

use thiserror::Error;
use uuid::Uuid;

use crate::chat::guardrail::safe_response;
use crate::chat::telemetry::log_telemetry;
use crate::chat::prompts;
use crate::llm_client::LlmError;
use crate::retrieval::embeddings::EmbeddingError;
use crate::state::AppState;

/// A pipeline failure with its external cause preserved, so logs and tests
/// can tell an embedding outage from a completion outage. The handler folds
/// either into the same user-facing fallback response.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("embedding call failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("completion call failed: {0}")]
    Completion(#[from] LlmError),
}

/// Successful chain outcome. `NoData` covers both "nothing cleared the
/// similarity threshold" and "the model produced a blank or no-information
/// answer"; the caller renders it as the fixed fallback with success status.
#[derive(Debug, PartialEq)]
pub enum ChainOutcome {
    Answered(String),
    NoData,
}

/// Runs the direct retrieval chain for one query.
pub async fn run_query_chain(
    state: &AppState,
    session_id: Uuid,
    query: &str,
) -> Result<ChainOutcome, PipelineError> {
    let hits = state.retriever.retrieve(query).await?;
    if hits.is_empty() {
        log_telemetry(session_id, query, prompts::NO_INFORMATION_FALLBACK);
        return Ok(ChainOutcome::NoData);
    }

    let context: Vec<String> = hits.iter().map(|hit| hit.chunk.text.clone()).collect();
    let prompt = prompts::build_rag_prompt(&context, query);
    let raw = state.llm.complete(&prompt).await?;

    if is_no_information(&raw) {
        log_telemetry(session_id, query, prompts::NO_INFORMATION_FALLBACK);
        return Ok(ChainOutcome::NoData);
    }

    let answer = safe_response(&raw);
    log_telemetry(session_id, query, &answer);
    Ok(ChainOutcome::Answered(answer))
}

/// Blank answers and explicit "no relevant information" answers are
/// normalized to the fixed fallback.
fn is_no_information(answer: &str) -> bool {
    answer.trim().is_empty() || answer.to_lowercase().contains("no relevant information")
}
