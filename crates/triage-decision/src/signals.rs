//! The values aggregation reads out of a set of assessments.

use triage_core::models::{Assessment, DestinationKind};
use triage_core::Confidence;

/// Routing, urgency and excitement readings for one item.
///
/// Missing assessments read as zero: an absent routing assessment is as
/// uncertain as a timed-out one.
#[derive(Debug, Clone, Default)]
pub struct Signals<'a> {
    pub routing: Option<&'a Assessment>,
    pub urgency: Option<&'a Assessment>,
    pub excitement: Option<&'a Assessment>,
}

impl<'a> Signals<'a> {
    /// First assessment of each kind, in the order given.
    pub fn read(assessments: &'a [Assessment]) -> Self {
        Self {
            routing: assessments.iter().find(|a| a.is_routing()),
            urgency: assessments.iter().find(|a| a.urgency_level().is_some()),
            excitement: assessments.iter().find(|a| a.excitement_score().is_some()),
        }
    }

    pub fn routing_confidence(&self) -> Confidence {
        self.routing.map(|a| a.confidence).unwrap_or_default()
    }

    pub fn excitement(&self) -> Confidence {
        self.excitement.map(|a| a.confidence).unwrap_or_default()
    }

    /// Urgency confidence when it indicates Immediate or Today.
    pub fn pressing_urgency(&self) -> Option<Confidence> {
        self.urgency
            .filter(|a| a.urgency_level().is_some_and(|l| l.warrants_surface()))
            .map(|a| a.confidence)
    }

    /// Strength of any urgency signal; a `whenever` reading counts as none.
    pub fn urgency_strength(&self) -> Confidence {
        match self.urgency {
            Some(a) if a.urgency_level().is_some_and(|l| l.rank() > 0) => a.confidence,
            _ => Confidence::ZERO,
        }
    }

    pub fn destination(&self) -> Option<(String, Option<DestinationKind>, Option<String>)> {
        let routing = self.routing?;
        match &routing.payload {
            triage_core::models::AssessmentPayload::Routing {
                destination: Some(destination),
                destination_kind,
                rule_id,
                ..
            } => Some((destination.clone(), *destination_kind, rule_id.clone())),
            _ => None,
        }
    }
}
