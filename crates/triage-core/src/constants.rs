/// Canonical assessor names. Stored verbatim in the decision log.
pub const ROUTING_ASSESSOR: &str = "routing";
pub const URGENCY_ASSESSOR: &str = "urgency";
pub const EXCITEMENT_ASSESSOR: &str = "excitement";

/// Rationale attached to the fallback assessment of a timed-out assessor.
pub const TIMEOUT_RATIONALE: &str = "timeout";

/// Hard ceiling for the confidence of a routing assessment with no matching rule.
pub const MAX_UNCERTAIN_ROUTING_CONFIDENCE: f64 = 0.2;

/// Number of independent urgency signal kinds (lexicon, deadline, action verb).
pub const URGENCY_SIGNAL_KINDS: usize = 3;

/// Environment variable holding the tracing filter.
pub const LOG_ENV_VAR: &str = "TRIAGE_LOG";
