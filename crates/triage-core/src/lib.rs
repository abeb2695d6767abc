//! # triage-core
//!
//! Foundation crate for the triage routing engine.
//! Defines all types, traits, errors, config, and constants.
//! Every other crate in the workspace depends on this.

pub mod confidence;
pub mod config;
pub mod constants;
pub mod errors;
pub mod models;
pub mod traits;

// Re-export the most commonly used types at the crate root.
pub use confidence::Confidence;
pub use config::TriageConfig;
pub use errors::{TriageError, TriageResult};
pub use models::{
    Action, Assessment, AssessmentPayload, AssessorOutcome, Decision, DecisionLogEntry, Item,
    LogRecord, Mode,
};
