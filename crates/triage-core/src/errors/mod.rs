//! Error hierarchy. Subsystem errors fold into [`TriageError`] via `#[from]`.

mod calibration_error;
mod execution_error;
mod pipeline_error;
mod rule_error;
mod storage_error;

pub use calibration_error::CalibrationError;
pub use execution_error::ExecutionError;
pub use pipeline_error::PipelineError;
pub use rule_error::RuleError;
pub use storage_error::StorageError;

/// Top-level error type for the triage engine.
#[derive(Debug, thiserror::Error)]
pub enum TriageError {
    #[error("storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("rule error: {0}")]
    RuleError(#[from] RuleError),

    #[error("pipeline error: {0}")]
    PipelineError(#[from] PipelineError),

    #[error("calibration error: {0}")]
    CalibrationError(#[from] CalibrationError),

    #[error("execution error: {0}")]
    ExecutionError(#[from] ExecutionError),

    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("concurrency error: {0}")]
    ConcurrencyError(String),
}

pub type TriageResult<T> = Result<T, TriageError>;
