//! Per-request chat flow: decision list, RAG pipeline, guardrail, telemetry.

pub mod agent;
pub mod guardrail;
pub mod handlers;
pub mod models;
pub mod pipeline;
pub mod prompts;
pub mod telemetry;
