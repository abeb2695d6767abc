//! Per-item lifecycle: Captured → ModeAssigned → Evaluating → Decided → Logged.

use triage_core::errors::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LifecycleStage {
    Captured,
    ModeAssigned,
    Evaluating,
    Decided,
    Logged,
}

impl LifecycleStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Captured => "captured",
            Self::ModeAssigned => "mode_assigned",
            Self::Evaluating => "evaluating",
            Self::Decided => "decided",
            Self::Logged => "logged",
        }
    }

    fn next(self) -> Option<Self> {
        match self {
            Self::Captured => Some(Self::ModeAssigned),
            Self::ModeAssigned => Some(Self::Evaluating),
            Self::Evaluating => Some(Self::Decided),
            Self::Decided => Some(Self::Logged),
            Self::Logged => None,
        }
    }
}

/// Tracks one item through the pipeline. Stages advance one at a time;
/// `Logged` is terminal.
#[derive(Debug, Clone)]
pub struct ItemLifecycle {
    item_id: String,
    stage: LifecycleStage,
}

impl ItemLifecycle {
    pub fn new(item_id: &str) -> Self {
        Self {
            item_id: item_id.to_string(),
            stage: LifecycleStage::Captured,
        }
    }

    pub fn stage(&self) -> LifecycleStage {
        self.stage
    }

    pub fn advance(&mut self, to: LifecycleStage) -> Result<(), PipelineError> {
        if self.stage.next() != Some(to) {
            return Err(PipelineError::InvalidTransition {
                item_id: self.item_id.clone(),
                from: self.stage.as_str().to_string(),
                to: to.as_str().to_string(),
            });
        }
        self.stage = to;
        Ok(())
    }
}
