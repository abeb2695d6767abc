//! Ordered collection of assessors. Registration order is the canonical order
//! of assessments within a decision.

use std::sync::Arc;

use triage_core::config::TriageConfig;
use triage_core::errors::{TriageError, TriageResult};
use triage_core::models::{AssessorOutcome, Item, Mode};
use triage_core::traits::IAssessor;
use triage_rules::RuleTable;

use crate::{ExcitementAssessor, RoutingAssessor, UrgencyAssessor};

#[derive(Clone, Default)]
pub struct AssessorSet {
    assessors: Vec<Arc<dyn IAssessor>>,
}

impl AssessorSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Routing, urgency and excitement over one rule table snapshot.
    pub fn standard(table: Arc<RuleTable>, config: &TriageConfig) -> Self {
        Self {
            assessors: vec![
                Arc::new(RoutingAssessor::new(Arc::clone(&table), config.routing.clone())),
                Arc::new(UrgencyAssessor::new(Arc::clone(&table), config.urgency.clone())),
                Arc::new(ExcitementAssessor::new(table, config.excitement.clone())),
            ],
        }
    }

    /// Add an assessor. Names must be unique.
    pub fn register(&mut self, assessor: Arc<dyn IAssessor>) -> TriageResult<()> {
        if self.get(assessor.name()).is_some() {
            return Err(TriageError::ConfigError(format!(
                "assessor '{}' registered twice",
                assessor.name()
            )));
        }
        self.assessors.push(assessor);
        Ok(())
    }

    pub fn with(mut self, assessor: Arc<dyn IAssessor>) -> TriageResult<Self> {
        self.register(assessor)?;
        Ok(self)
    }

    pub fn assessors(&self) -> &[Arc<dyn IAssessor>] {
        &self.assessors
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn IAssessor>> {
        self.assessors.iter().find(|a| a.name() == name)
    }

    /// Names of the assessors a decision in `mode` must contain.
    pub fn required_in(&self, mode: Mode) -> Vec<&str> {
        self.assessors
            .iter()
            .filter(|a| a.required_in(mode))
            .map(|a| a.name())
            .collect()
    }

    /// Run every assessor inline, in registration order.
    pub fn evaluate_all(&self, item: &Item, mode: Mode) -> Vec<AssessorOutcome> {
        self.assessors.iter().map(|a| a.evaluate(item, mode)).collect()
    }

    pub fn len(&self) -> usize {
        self.assessors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assessors.is_empty()
    }
}
