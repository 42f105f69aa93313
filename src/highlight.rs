//! Feedback-to-text alignment
//!
//! Maps the free-text `targetText` of each feedback item back onto ranges of
//! the section content for inline highlighting. Matching is exact substring
//! only; a target the model misquoted simply gets no inline highlight (it
//! still shows up in the feedback list).

use crate::feedback::FeedbackRecord;
use std::collections::HashSet;

/// What a highlighted range represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Plain,
    Error,
    Suggestion,
}

/// A half-open range of **character** indices into a specific text, tagged
/// with how it should be rendered. Derived per render, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub start: usize,
    pub end: usize,
    pub category: Category,
}

impl HighlightSpan {
    /// Slice the span out of the text it was computed for.
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        let start = byte_of(text, self.start);
        let end = byte_of(text, self.end);
        &text[start..end]
    }
}

/// Byte offset of the `char_idx`-th character (text length when past the end).
fn byte_of(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

fn char_index(text: &str, byte_idx: usize) -> usize {
    text[..byte_idx].chars().count()
}

/// Compute non-overlapping highlight spans for `text` from `feedback`.
///
/// Candidates are taken from `errors` then `suggestions`; each is anchored at
/// the first exact occurrence of its target. Overlap resolution favors the
/// earliest-starting, earliest-listed candidate; later overlapping candidates
/// are dropped, not merged. Concatenating the slices of the returned spans
/// reproduces `text` exactly.
pub fn align(text: &str, feedback: Option<&FeedbackRecord>) -> Vec<HighlightSpan> {
    let total_chars = text.chars().count();

    let Some(feedback) = feedback else {
        return vec![HighlightSpan { start: 0, end: total_chars, category: Category::Plain }];
    };
    if feedback.is_clean() {
        return vec![HighlightSpan { start: 0, end: total_chars, category: Category::Plain }];
    }

    // (byte start, byte len, category), errors before suggestions so the
    // stable sort keeps errors first on equal starts.
    let mut candidates: Vec<(usize, usize, Category)> = Vec::new();
    let tagged = feedback
        .errors
        .iter()
        .map(|item| (item, Category::Error))
        .chain(feedback.suggestions.iter().map(|item| (item, Category::Suggestion)));
    for (item, category) in tagged {
        if item.target_text.is_empty() {
            continue;
        }
        if let Some(start) = text.find(&item.target_text) {
            candidates.push((start, item.target_text.len(), category));
        }
    }
    candidates.sort_by_key(|&(start, _, _)| start);

    let mut spans = Vec::new();
    let mut cursor = 0usize;
    let mut claimed = HashSet::new();
    for (start, len, category) in candidates {
        if start < cursor || claimed.contains(&start) {
            continue;
        }
        if start > cursor {
            spans.push(HighlightSpan {
                start: char_index(text, cursor),
                end: char_index(text, start),
                category: Category::Plain,
            });
        }
        spans.push(HighlightSpan {
            start: char_index(text, start),
            end: char_index(text, start + len),
            category,
        });
        cursor = start + len;
        claimed.insert(start);
    }
    if cursor < text.len() {
        spans.push(HighlightSpan {
            start: char_index(text, cursor),
            end: total_chars,
            category: Category::Plain,
        });
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::FeedbackItem;

    fn item(target: &str) -> FeedbackItem {
        FeedbackItem {
            kind: "WRONG_SECTION".to_string(),
            message: "Sai vị trí".to_string(),
            target_text: target.to_string(),
            details: Vec::new(),
        }
    }

    fn record(errors: &[&str], suggestions: &[&str]) -> FeedbackRecord {
        FeedbackRecord {
            errors: errors.iter().map(|t| item(t)).collect(),
            suggestions: suggestions.iter().map(|t| item(t)).collect(),
        }
    }

    fn round_trip(text: &str, feedback: Option<&FeedbackRecord>) -> String {
        align(text, feedback).iter().map(|s| s.slice(text)).collect()
    }

    #[test]
    fn test_no_feedback_yields_single_plain_span() {
        let spans = align("hello world", None);
        assert_eq!(
            spans,
            vec![HighlightSpan { start: 0, end: 11, category: Category::Plain }]
        );
    }

    #[test]
    fn test_clean_record_yields_single_plain_span() {
        let spans = align("hello world", Some(&FeedbackRecord::default()));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].category, Category::Plain);
    }

    #[test]
    fn test_single_match_uses_character_indices() {
        let text = "Đau ngực trái";
        let record = record(&["Đau ngực"], &[]);
        let spans = align(text, Some(&record));
        assert_eq!(
            spans,
            vec![
                HighlightSpan { start: 0, end: 8, category: Category::Error },
                HighlightSpan { start: 8, end: 13, category: Category::Plain },
            ]
        );
        assert_eq!(spans[0].slice(text), "Đau ngực");
    }

    #[test]
    fn test_overlapping_suggestion_is_dropped() {
        let record = record(&["abc"], &["bcd"]);
        let spans = align("abcdef", Some(&record));
        assert_eq!(
            spans,
            vec![
                HighlightSpan { start: 0, end: 3, category: Category::Error },
                HighlightSpan { start: 3, end: 6, category: Category::Plain },
            ]
        );
    }

    #[test]
    fn test_equal_start_prefers_the_error() {
        let record = record(&["ab"], &["abc"]);
        let spans = align("abc", Some(&record));
        assert_eq!(
            spans,
            vec![
                HighlightSpan { start: 0, end: 2, category: Category::Error },
                HighlightSpan { start: 2, end: 3, category: Category::Plain },
            ]
        );
    }

    #[test]
    fn test_missing_target_renders_fully_plain() {
        let record = record(&["not present"], &[]);
        let spans = align("hello world", Some(&record));
        assert_eq!(
            spans,
            vec![HighlightSpan { start: 0, end: 11, category: Category::Plain }]
        );
    }

    #[test]
    fn test_empty_target_is_section_level_only() {
        let record = record(&[""], &[]);
        let spans = align("hello", Some(&record));
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].category, Category::Plain);
    }

    #[test]
    fn test_only_first_occurrence_is_highlighted() {
        let record = record(&["sốt"], &[]);
        let text = "sốt cao, sốt về chiều";
        let spans = align(text, Some(&record));
        assert_eq!(spans[0].category, Category::Error);
        assert_eq!(spans[0].slice(text), "sốt");
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_interleaved_errors_and_suggestions_sort_by_start() {
        let text = "khó thở khi gắng sức, đau ngực trái";
        let record = record(&["đau ngực"], &["khó thở"]);
        let spans = align(text, Some(&record));
        let categories: Vec<Category> = spans.iter().map(|s| s.category).collect();
        assert_eq!(
            categories,
            vec![Category::Suggestion, Category::Plain, Category::Error, Category::Plain]
        );
        assert_eq!(round_trip(text, Some(&record)), text);
    }

    #[test]
    fn test_round_trip_reproduces_text_exactly() {
        let cases = [
            ("", record(&[], &[])),
            ("bụng mềm, gan lách không to", record(&["gan lách"], &["bụng mềm"])),
            ("Đau ngực trái lan lên vai", record(&["Đau ngực trái lan lên vai"], &[])),
            ("sốt 38.5 độ kèm vàng da", record(&["vàng da", "sốt 38.5 độ"], &["38.5"])),
            ("no matches here", record(&["xyz"], &["zyx"])),
        ];
        for (text, record) in &cases {
            assert_eq!(&round_trip(text, Some(record)), text, "failed for {:?}", text);
        }
    }
}
