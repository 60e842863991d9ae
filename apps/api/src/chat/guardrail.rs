//! Post-generation content guardrail.

use crate::chat::prompts::{NO_INFORMATION_FALLBACK, UNSAFE_TOPIC_REFUSAL};

/// Substrings that trip the refusal, matched case-insensitively.
const UNSAFE_KEYWORDS: [&str; 3] = ["hack", "illegal", "piracy"];

/// Pure post-generation filter:
/// - any blocklisted keyword (case-insensitive) → fixed refusal string
/// - empty or whitespace-only text → fixed no-information string
/// - otherwise the input, unchanged
pub fn safe_response(text: &str) -> String {
    let lowered = text.to_lowercase();
    if UNSAFE_KEYWORDS.iter().any(|word| lowered.contains(word)) {
        return UNSAFE_TOPIC_REFUSAL.to_string();
    }
    if text.trim().is_empty() {
        return NO_INFORMATION_FALLBACK.to_string();
    }
    text.to_string()
}
