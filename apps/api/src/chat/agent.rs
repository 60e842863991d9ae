//! "Agentic" sequential chain.
//!
//! Named for the multi-step workflow it mirrors upstream, but deliberately a
//! fixed linear sequence identical in shape to the direct chain: retrieve,
//! prompt, generate, guardrail, telemetry. No planning, looping, or tool
//! use. Unlike the direct chain it does not short-circuit on empty
//! retrieval; the model is called with empty context and the guardrail's
//! blank-answer rule supplies the fallback.

use uuid::Uuid;

use crate::chat::guardrail::safe_response;
use crate::chat::pipeline::PipelineError;
use crate::chat::prompts;
use crate::chat::telemetry::log_telemetry;
use crate::state::AppState;

/// Runs the agentic chain for one query, returning the guardrail-filtered
/// answer text.
pub async fn run_agent_chain(
    state: &AppState,
    session_id: Uuid,
    query: &str,
) -> Result<String, PipelineError> {
    let hits = state.retriever.retrieve(query).await?;
    let context: Vec<String> = hits.iter().map(|hit| hit.chunk.text.clone()).collect();

    let prompt = prompts::build_agent_prompt(&context, query);
    let raw = state.llm.complete(&prompt).await?;

    let answer = safe_response(&raw);
    log_telemetry(session_id, query, &answer);
    Ok(answer)
}
