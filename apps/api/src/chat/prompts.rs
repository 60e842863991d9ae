//! Canned response strings and prompt assembly.
//!
//! These strings are part of the API contract: tests and the frontend match
//! on them exactly, so edits here are breaking changes.

/// Returned verbatim for exact greeting queries.
pub const GREETING_RESPONSE: &str = "Hello! How can I assist you with your career goals today?";

/// Returned when no data is available, the answer is blank, or any pipeline
/// step fails.
pub const NO_INFORMATION_FALLBACK: &str = "I don’t have specific information on that, \
     but consider exploring online courses or consulting a career coach.";

/// Returned by the guardrail when the generated text trips the blocklist.
pub const UNSAFE_TOPIC_REFUSAL: &str = "I’m unable to provide guidance on that topic. \
     Please ask something related to career or learning.";

/// Returned verbatim for "other recommendations" / "already familiar" queries.
pub const ALTERNATIVE_RESOURCES: &str =
    "To develop skills for a Software Engineer, Machine Learning role, consider these alternatives: \
     1. fast.ai for practical deep learning courses. \
     2. DeepLearning.AI for specialized AI certifications. \
     3. Kaggle competitions to build hands-on ML projects. \
     4. Contributing to open-source ML projects on GitHub. \
     These can help you gain practical experience and stand out.";

/// System instruction for the direct RAG chain. `{context}` is replaced with
/// the retrieved chunk texts at assembly time.
const MENTOR_SYSTEM_PROMPT: &str =
    "You are SkillBridge AI, a career mentorship assistant. You provide concise, actionable \
     advice on skill development, job preparation, and career planning based on job market data \
     and learning resources. \
     For greetings like 'hi' or 'hello', respond with: 'Hello! How can I assist you with your \
     career goals today?' \
     For follow-up queries about alternative resources (e.g., 'other recommendations'), exclude \
     previously mentioned resources (Coursera, Udemy, freeCodeCamp) and suggest alternatives \
     like fast.ai, DeepLearning.AI, Kaggle, or GitHub open-source projects. \
     If no relevant data is available or the query is unclear, respond: 'I don’t have specific \
     information on that, but consider exploring online courses or consulting a career coach.'\
     \n\n{context}";

/// Shorter framing used by the agentic sequential chain.
const AGENT_SYSTEM_PROMPT: &str = "You are SkillBridge AI, a responsible career mentor.";

/// Assembles the direct-chain prompt: system instruction with retrieved
/// context stuffed in, followed by the raw user query.
pub fn build_rag_prompt(context: &[String], query: &str) -> String {
    let system = MENTOR_SYSTEM_PROMPT.replace("{context}", &context.join("\n"));
    format!("{system}\n\nHuman: {query}")
}

/// Assembles the agentic-chain prompt: query first, context appended.
pub fn build_agent_prompt(context: &[String], query: &str) -> String {
    format!(
        "{AGENT_SYSTEM_PROMPT}\n\nHuman: {query}\nContext:\n{}",
        context.join("\n")
    )
}
