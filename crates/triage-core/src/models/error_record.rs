use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error taxonomy recorded on the error stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    TransientIo,
    MalformedInput,
    AssessorTimeout,
    RuleParse,
    LogWriteFailure,
    CalibrationFailure,
    ExecutionFailure,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TransientIo => "transient_io",
            Self::MalformedInput => "malformed_input",
            Self::AssessorTimeout => "assessor_timeout",
            Self::RuleParse => "rule_parse",
            Self::LogWriteFailure => "log_write_failure",
            Self::CalibrationFailure => "calibration_failure",
            Self::ExecutionFailure => "execution_failure",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "transient_io" => Self::TransientIo,
            "malformed_input" => Self::MalformedInput,
            "assessor_timeout" => Self::AssessorTimeout,
            "rule_parse" => Self::RuleParse,
            "log_write_failure" => Self::LogWriteFailure,
            "calibration_failure" => Self::CalibrationFailure,
            "execution_failure" => Self::ExecutionFailure,
            _ => return None,
        })
    }
}

/// One entry on the error stream, kept apart from the decision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub item_id: Option<String>,
    pub kind: ErrorKind,
    pub context: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(kind: ErrorKind, item_id: Option<&str>, context: impl Into<String>) -> Self {
        Self {
            item_id: item_id.map(str::to_string),
            kind,
            context: context.into(),
            timestamp: Utc::now(),
        }
    }
}
