/// Rule document errors. Fatal at load time; a failed reload keeps the last good table.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error("cannot read rule document {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("rule document is not valid TOML: {reason}")]
    Syntax { reason: String },

    #[error("rule '{rule_id}' has an invalid pattern: {reason}")]
    InvalidPattern { rule_id: String, reason: String },

    #[error("rule '{rule_id}' weight {weight} is outside [0, 1]")]
    WeightOutOfRange { rule_id: String, weight: f64 },

    #[error("rule id '{rule_id}' is declared more than once")]
    DuplicateRule { rule_id: String },

    #[error("rule '{rule_id}' has neither keywords nor a pattern")]
    EmptyMatcher { rule_id: String },

    #[error("rule store lock poisoned")]
    StorePoisoned,
}
