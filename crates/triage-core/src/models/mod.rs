mod assessment;
mod correction;
mod decision;
mod error_record;
mod item;
mod log_entry;
mod mode;
mod reports;
mod routing_rule;

pub use assessment::{Assessment, AssessmentPayload, AssessorOutcome, UrgencyLevel};
pub use correction::{CorrectionEvent, CorrectionKind};
pub use decision::{Action, Decision, DecisionBranch, PlannedOutcome, SurfaceTrigger};
pub use error_record::{ErrorKind, ErrorRecord};
pub use item::{ContentType, Item, ItemProblem, SourceMetadata, TagState};
pub use log_entry::{DecisionLogEntry, ExecutionRecord, ExecutionStatus, LogRecord};
pub use mode::Mode;
pub use reports::{BatchReport, CalibrationReport, WeightDelta};
pub use routing_rule::{DestinationKind, RoutingRule, RuleMatcher, RuleWeight};
