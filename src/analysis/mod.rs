//! Analysis client
//!
//! Sends one section of the report to the reviewer model and turns the
//! response into a `FeedbackRecord`. Every failure mode is absorbed here:
//! callers always get back a well-formed record or `None`, never an error.

mod client;
mod parse;

use crate::config::Config;
use crate::feedback::FeedbackRecord;
use crate::prompt;
use crate::report::{CaseReport, SectionId};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Client for the reviewer model. Holds no mutable state, so concurrent
/// `analyze` calls from one clone or many are safe.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl AnalysisClient {
    /// Build a client from config, resolving the API key once up front.
    pub fn new(config: &Config) -> Self {
        Self::with_api_key(&config.model, config.resolve_api_key())
    }

    /// Build a client with an explicit key (or none). Useful when the host
    /// application manages credentials itself.
    pub fn with_api_key(model: &str, api_key: Option<String>) -> Self {
        AnalysisClient {
            http: reqwest::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    /// Whether a key is configured. Analysis still runs without one, but
    /// every attempt yields a config-error card.
    pub fn is_available(&self) -> bool {
        self.api_key.is_some()
    }

    /// Analyze one section in the context of the whole report.
    ///
    /// Resolves to `None` when the section has no content (no prompt is
    /// built, no call is made). Otherwise always resolves to a record:
    /// missing credentials and service failures come back as synthetic
    /// single-error records, never as faults.
    pub async fn analyze(
        &self,
        section: SectionId,
        report: &CaseReport,
    ) -> Option<FeedbackRecord> {
        if report.section(section).is_empty() {
            return None;
        }

        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!(section = %section, "analysis requested without an API key");
            return Some(FeedbackRecord::config_error());
        };

        let prompt = prompt::build(section, report);
        let result = client::call_model(&self.http, &self.base_url, &self.model, api_key, &prompt)
            .await
            .and_then(|text| parse::parse_feedback(&text));

        match result {
            Ok(record) => {
                tracing::debug!(
                    section = %section,
                    errors = record.errors.len(),
                    suggestions = record.suggestions.len(),
                    "analysis complete"
                );
                Some(record)
            }
            Err(err) => {
                tracing::warn!(section = %section, %err, "analysis failed");
                Some(FeedbackRecord::service_error())
            }
        }
    }
}
