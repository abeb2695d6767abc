/// Per-item pipeline errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("invalid lifecycle transition for item {item_id}: {from} -> {to}")]
    InvalidTransition {
        item_id: String,
        from: String,
        to: String,
    },

    #[error("evaluation of item {item_id} was cancelled")]
    Cancelled { item_id: String },

    #[error("item source error: {reason}")]
    ItemSource { reason: String },

    #[error("item {item_id} not found")]
    ItemNotFound { item_id: String },

    #[error("no decision at seq {seq}")]
    DecisionNotFound { seq: u64 },

    #[error("background task failed: {reason}")]
    TaskFailed { reason: String },
}
