use serde::{Deserialize, Serialize};

use crate::errors::ExecutionError;
use crate::models::{Action, DestinationKind, Item};

/// What an executor is asked to do for one logged decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRequest {
    pub decision_seq: u64,
    pub item: Item,
    pub action: Action,
    pub destination: Option<String>,
    pub destination_kind: DestinationKind,
}

/// Executor acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
    /// Where the collaborator put the content (path, issue key, event id).
    pub location: String,
}

/// External collaborator that carries out an action.
pub trait IActionExecutor: Send + Sync {
    /// Destination kinds this executor accepts.
    fn kinds(&self) -> &[DestinationKind];

    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReceipt, ExecutionError>;
}
