/// Errors reported by action executors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExecutionError {
    /// Collaborator temporarily unavailable. Retried with backoff.
    #[error("transient executor failure: {reason}")]
    Transient { reason: String },

    /// Collaborator rejected the request. Not retried.
    #[error("executor rejected request: {reason}")]
    Rejected { reason: String },

    #[error("no executor registered for destination kind '{kind}'")]
    NoExecutor { kind: String },
}

impl ExecutionError {
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}
