//! Feedback records returned by one analysis cycle
//!
//! Wire names (`type`, `targetText`) follow the response schema the model is
//! constrained to, so the records deserialize straight from the service.

use serde::{Deserialize, Serialize};

/// Failure-mode kinds produced locally, never by the model.
pub const KIND_CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const KIND_SERVICE_ERROR: &str = "SERVICE_ERROR";
pub const KIND_GENERAL_ERROR: &str = "GENERAL_ERROR";

/// One piece of feedback, either an error or a suggestion depending on which
/// list it arrived in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackItem {
    /// Machine-readable kind (e.g. `WRONG_SECTION`, `CLARIFY_SYMPTOM`).
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Short title shown on the feedback card.
    #[serde(default)]
    pub message: String,
    /// Exact substring of the section content this refers to. Empty means a
    /// section-level comment with no inline highlight.
    #[serde(rename = "targetText", default)]
    pub target_text: String,
    /// Longer explanation or checklist, one entry per line.
    #[serde(default)]
    pub details: Vec<String>,
}

/// The result of one analysis cycle. Both lists empty is a valid clean
/// result; "no analysis yet" is `None` at the session, not an empty record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackRecord {
    #[serde(default)]
    pub errors: Vec<FeedbackItem>,
    #[serde(default)]
    pub suggestions: Vec<FeedbackItem>,
}

impl FeedbackRecord {
    /// A record carrying exactly one error item and no suggestions. Used for
    /// the locally synthesized failure records.
    fn single_error(kind: &str, message: &str, details: Vec<String>) -> Self {
        FeedbackRecord {
            errors: vec![FeedbackItem {
                kind: kind.to_string(),
                message: message.to_string(),
                target_text: String::new(),
                details,
            }],
            suggestions: Vec::new(),
        }
    }

    /// Missing credentials: fatal to this analysis attempt, not the session.
    pub fn config_error() -> Self {
        Self::single_error(
            KIND_CONFIG_ERROR,
            "Lỗi Cấu Hình",
            vec!["API key chưa được thiết lập.".to_string()],
        )
    }

    /// Transport, parse, or schema failure while talking to the service.
    pub fn service_error() -> Self {
        Self::single_error(
            KIND_SERVICE_ERROR,
            "Lỗi API",
            vec!["Đã có lỗi xảy ra khi kết nối với Người Thầy AI.".to_string()],
        )
    }

    /// Catch-all for faults that escape the client's own guarantees.
    pub fn general_error() -> Self {
        Self::single_error(
            KIND_GENERAL_ERROR,
            "Không thể phân tích. Vui lòng thử lại.",
            Vec::new(),
        )
    }

    /// True when the cycle produced neither errors nor suggestions.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.suggestions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_wire_names_and_defaults() {
        let record: FeedbackRecord = serde_json::from_str(
            r#"{"errors": [{"type": "WRONG_SECTION", "message": "Sai vị trí", "targetText": "ran ẩm"}]}"#,
        )
        .unwrap();
        assert_eq!(record.errors.len(), 1);
        assert_eq!(record.errors[0].kind, "WRONG_SECTION");
        assert_eq!(record.errors[0].target_text, "ran ẩm");
        assert!(record.errors[0].details.is_empty());
        assert!(record.suggestions.is_empty());
    }

    #[test]
    fn test_failure_records_carry_one_error_and_no_target() {
        for record in [
            FeedbackRecord::config_error(),
            FeedbackRecord::service_error(),
            FeedbackRecord::general_error(),
        ] {
            assert_eq!(record.errors.len(), 1);
            assert!(record.suggestions.is_empty());
            assert!(record.errors[0].target_text.is_empty());
            assert!(!record.is_clean());
        }
        assert_eq!(FeedbackRecord::config_error().errors[0].kind, KIND_CONFIG_ERROR);
        assert_eq!(FeedbackRecord::service_error().errors[0].kind, KIND_SERVICE_ERROR);
    }

    #[test]
    fn test_clean_record_is_distinct_from_absent() {
        let clean = FeedbackRecord::default();
        assert!(clean.is_clean());
        let none: Option<FeedbackRecord> = None;
        assert_ne!(Some(clean), none);
    }
}
