//! HTTP client for the generative language service
//!
//! One call per analysis: the prompt goes out with a generation config that
//! constrains the response to the feedback JSON schema, the raw response
//! text comes back. Parsing lives in `parse`.

use serde::{Deserialize, Serialize};
use serde_json::json;

/// Rate limit retry configuration
const MAX_RETRIES: u32 = 2;
const INITIAL_BACKOFF_MS: u64 = 2000;
const BACKOFF_MULTIPLIER: u64 = 2;

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: &'static str,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
    #[serde(rename = "thinkingConfig")]
    thinking_config: ThinkingConfig,
}

#[derive(Serialize)]
struct ThinkingConfig {
    #[serde(rename = "thinkingBudget")]
    thinking_budget: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

/// The schema the model's response is constrained to: two arrays of feedback
/// items. Field descriptions steer the model toward verbatim target quotes.
fn response_schema() -> serde_json::Value {
    let item = json!({
        "type": "OBJECT",
        "properties": {
            "type": {
                "type": "STRING",
                "description": "A machine-readable kind (e.g. 'WRONG_SECTION', 'CLARIFY_SYMPTOM')."
            },
            "message": {
                "type": "STRING",
                "description": "A short, impactful title for the feedback card."
            },
            "targetText": {
                "type": "STRING",
                "description": "The exact text from the student's input that this feedback refers to."
            },
            "details": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "A detailed explanation or checklist for the student."
            }
        }
    });
    json!({
        "type": "OBJECT",
        "properties": {
            "errors": { "type": "ARRAY", "items": item },
            "suggestions": { "type": "ARRAY", "items": item }
        }
    })
}

/// Call the model and return the raw response text (expected to be the
/// schema-constrained JSON). Retries briefly on rate limits; all other
/// failures surface as errors for the caller to absorb.
pub(crate) async fn call_model(
    http: &reqwest::Client,
    base_url: &str,
    model: &str,
    api_key: &str,
    prompt: &str,
) -> anyhow::Result<String> {
    let url = format!("{}/{}:generateContent", base_url, model);
    let request = GenerateRequest {
        contents: vec![Content { parts: vec![Part { text: prompt }] }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: response_schema(),
            // Thinking disabled: feedback latency matters more than depth.
            thinking_config: ThinkingConfig { thinking_budget: 0 },
        },
    };

    tracing::debug!(model, prompt_len = prompt.len(), "requesting analysis");

    let mut retry_count = 0;
    loop {
        let response = http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        if status.is_success() {
            let parsed: GenerateResponse = serde_json::from_str(&text)
                .map_err(|e| anyhow::anyhow!("failed to parse service response: {}", e))?;
            let content: String = parsed
                .candidates
                .first()
                .and_then(|c| c.content.as_ref())
                .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
                .unwrap_or_default();
            if content.is_empty() {
                anyhow::bail!("service response contained no candidate text");
            }
            return Ok(content);
        }

        if status.as_u16() == 429 && retry_count < MAX_RETRIES {
            retry_count += 1;
            let backoff_ms = INITIAL_BACKOFF_MS * BACKOFF_MULTIPLIER.pow(retry_count - 1);
            tracing::warn!(
                backoff_ms,
                attempt = retry_count,
                "service rate limited, retrying"
            );
            tokio::time::sleep(tokio::time::Duration::from_millis(backoff_ms)).await;
            continue;
        }

        let detail = match status.as_u16() {
            400 | 401 | 403 => "request rejected (is the API key valid?)",
            429 => "rate limited after retries",
            500..=599 => "service unavailable",
            _ => "unexpected status",
        };
        anyhow::bail!("service error {}: {} ({})", status, detail, truncate(&text, 200));
    }
}

/// Truncate a string for error messages (Unicode-safe).
fn truncate(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_schema_lists_both_arrays() {
        let schema = response_schema();
        assert!(schema["properties"]["errors"].is_object());
        assert!(schema["properties"]["suggestions"].is_object());
        let item = &schema["properties"]["errors"]["items"]["properties"];
        for field in ["type", "message", "targetText", "details"] {
            assert!(item[field].is_object(), "schema is missing {}", field);
        }
    }

    #[test]
    fn test_request_serializes_with_wire_names() {
        let request = GenerateRequest {
            contents: vec![Content { parts: vec![Part { text: "xin chào" }] }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: response_schema(),
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "xin chào");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["thinkingConfig"]["thinkingBudget"], 0);
    }

    #[test]
    fn test_candidate_text_concatenates_parts() {
        let response: GenerateResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "{\"errors\""}, {"text": ": []}"}]}}]}"#,
        )
        .unwrap();
        let content: String = response
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| c.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();
        assert_eq!(content, r#"{"errors": []}"#);
    }

    #[test]
    fn test_truncate_is_unicode_safe() {
        assert_eq!(truncate("ééééé", 3), "ééé");
        assert_eq!(truncate("ab", 10), "ab");
    }
}
