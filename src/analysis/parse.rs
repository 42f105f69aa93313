//! Tolerant parsing of model responses
//!
//! The response is schema-constrained, but models still occasionally wrap
//! JSON in markdown fences or prose. Strip the wrapping, take the outermost
//! object, and let serde enforce the shape.

use crate::feedback::FeedbackRecord;

/// Strip markdown code fences from a response
fn strip_markdown_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let clean = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest
    } else {
        trimmed
    };
    let clean = clean.strip_suffix("```").unwrap_or(clean);
    clean.trim()
}

/// Extract the outermost `{ ... }` fragment, if any.
fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if start <= end {
        Some(&text[start..=end])
    } else {
        None
    }
}

/// Parse a model response into a feedback record. Lists absent from the
/// response default to empty; anything that still fails the schema is an
/// error for the caller to absorb.
pub(crate) fn parse_feedback(response: &str) -> anyhow::Result<FeedbackRecord> {
    let clean = strip_markdown_fences(response);
    let json = extract_json_object(clean).unwrap_or(clean);
    serde_json::from_str(json)
        .map_err(|e| anyhow::anyhow!("feedback did not match the response schema: {}", e))
}
