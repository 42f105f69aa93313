//! benhan library crate
//!
//! Core of the AI-guided case-report tutor: the case data model, the
//! debounced analysis pipeline, and the feedback-to-text alignment used for
//! inline highlighting. The interactive view layer is a consumer of this
//! crate, not part of it.

pub mod analysis;
pub mod config;
pub mod debounce;
pub mod feedback;
pub mod highlight;
pub mod prompt;
pub mod report;
pub mod session;
