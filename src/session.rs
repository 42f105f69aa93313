//! Session state and the debounced analysis pipeline
//!
//! The session owns the case report and the feedback slot; nothing else
//! mutates them. Edits apply synchronously and feed a debounced snapshot
//! stream; a pipeline task turns each emission into one analysis and
//! reports back over a message channel the session drains.
//!
//! Background tasks use `let _ =` for channel sends: if the receiver is
//! gone the session is shutting down and nobody is listening.

use crate::analysis::AnalysisClient;
use crate::debounce::{debounce, DebounceInput};
use crate::feedback::FeedbackRecord;
use crate::report::{CaseReport, SectionEdit, SectionId};
use chrono::{DateTime, Utc};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::time::Duration;

/// Messages from the analysis pipeline back to the session.
#[derive(Debug)]
pub enum SessionMessage {
    /// An analysis was triggered for a debounced snapshot.
    AnalysisStarted { generation: u64 },
    /// An analysis resolved. `None` means the section was empty and the
    /// call was skipped.
    FeedbackReady {
        generation: u64,
        feedback: Option<FeedbackRecord>,
    },
    /// The analysis task itself died. The client is supposed to make this
    /// unreachable; surfacing it is the catch-all of last resort.
    AnalysisCrashed { generation: u64, detail: String },
}

/// What the pipeline analyzes: the whole report plus the active section.
#[derive(Debug, Clone)]
struct Snapshot {
    section: SectionId,
    report: CaseReport,
}

/// One editing session over one case report.
pub struct Session {
    report: CaseReport,
    active_section: SectionId,
    feedback: Option<FeedbackRecord>,
    loading: bool,
    has_new_feedback: bool,
    last_analyzed_at: Option<DateTime<Utc>>,
    /// Generation of the newest started analysis; older resolutions are
    /// discarded so a slow superseded call can never overwrite new feedback.
    latest_generation: u64,
    input: DebounceInput<Snapshot>,
    rx: mpsc::UnboundedReceiver<SessionMessage>,
}

impl Session {
    /// Start a session with an all-empty report. The pristine state counts
    /// as a value: one analysis triggers after the first quiet period (and
    /// resolves to nothing, since the active section is empty).
    ///
    /// Spawns the scheduler and pipeline tasks, so this must run inside a
    /// tokio runtime.
    pub fn new(client: AnalysisClient, quiet: Duration) -> Self {
        let active_section = SectionId::ALL[0];
        let report = CaseReport::default();
        let initial = Snapshot { section: active_section, report: report.clone() };
        let (input, mut debounced) = debounce(initial, quiet);
        let (tx, rx) = mpsc::unbounded_channel();

        tokio::spawn(async move {
            let mut generation: u64 = 0;
            while let Some(snapshot) = debounced.recv().await {
                generation += 1;
                let _ = tx.send(SessionMessage::AnalysisStarted { generation });
                spawn_analysis(client.clone(), snapshot, generation, tx.clone());
            }
        });

        Session {
            report,
            active_section,
            feedback: None,
            loading: false,
            has_new_feedback: false,
            last_analyzed_at: None,
            latest_generation: 0,
            input,
            rx,
        }
    }

    pub fn report(&self) -> &CaseReport {
        &self.report
    }

    pub fn active_section(&self) -> SectionId {
        self.active_section
    }

    /// Feedback from the newest resolved analysis, or `None` before any
    /// analysis has produced a record.
    pub fn feedback(&self) -> Option<&FeedbackRecord> {
        self.feedback.as_ref()
    }

    /// True while an analysis is pending for the newest snapshot.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True when the newest record carries unseen errors or suggestions.
    pub fn has_new_feedback(&self) -> bool {
        self.has_new_feedback
    }

    pub fn last_analyzed_at(&self) -> Option<DateTime<Utc>> {
        self.last_analyzed_at
    }

    /// The active section rendered as text, the form highlight spans are
    /// computed against.
    pub fn active_text(&self) -> String {
        self.report.section(self.active_section).canonical_text()
    }

    /// Apply one section edit synchronously and schedule an analysis.
    pub fn apply_edit(&mut self, edit: SectionEdit) {
        self.report.apply(edit);
        self.push_snapshot();
    }

    /// Switch the active section. Schedules an analysis of the newly focused
    /// section, same as an edit would.
    pub fn select_section(&mut self, section: SectionId) {
        self.active_section = section;
        self.push_snapshot();
    }

    /// Clear the unseen-feedback flag (the feedback panel was opened).
    pub fn mark_feedback_seen(&mut self) {
        self.has_new_feedback = false;
    }

    fn push_snapshot(&mut self) {
        let snapshot = Snapshot {
            section: self.active_section,
            report: self.report.clone(),
        };
        if !self.input.send(snapshot) {
            tracing::warn!("analysis scheduler is gone; edits no longer trigger analysis");
        }
    }

    /// Apply all pending pipeline messages. Call from the host's event loop.
    pub fn drain_messages(&mut self) {
        while let Ok(msg) = self.rx.try_recv() {
            self.apply_message(msg);
        }
    }

    fn apply_message(&mut self, msg: SessionMessage) {
        match msg {
            SessionMessage::AnalysisStarted { generation } => {
                self.latest_generation = self.latest_generation.max(generation);
                self.loading = true;
            }
            SessionMessage::FeedbackReady { generation, feedback } => {
                if generation < self.latest_generation {
                    tracing::debug!(
                        generation,
                        latest = self.latest_generation,
                        "discarding superseded analysis result"
                    );
                    return;
                }
                self.loading = false;
                if let Some(record) = feedback {
                    self.has_new_feedback = !record.is_clean();
                    self.feedback = Some(record);
                    self.last_analyzed_at = Some(Utc::now());
                }
            }
            SessionMessage::AnalysisCrashed { generation, detail } => {
                if generation < self.latest_generation {
                    return;
                }
                tracing::error!(%detail, "analysis task crashed");
                self.loading = false;
                self.feedback = Some(FeedbackRecord::general_error());
                self.has_new_feedback = true;
            }
        }
    }
}

fn spawn_analysis(
    client: AnalysisClient,
    snapshot: Snapshot,
    generation: u64,
    tx: mpsc::UnboundedSender<SessionMessage>,
) {
    tokio::spawn(async move {
        let task_tx = tx.clone();
        let fut = async move {
            let feedback = client.analyze(snapshot.section, &snapshot.report).await;
            let _ = task_tx.send(SessionMessage::FeedbackReady { generation, feedback });
        };
        if let Err(panic) = AssertUnwindSafe(fut).catch_unwind().await {
            let detail = if let Some(s) = panic.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "unknown panic payload".to_string()
            };
            let _ = tx.send(SessionMessage::AnalysisCrashed { generation, detail });
        }
    });
}
