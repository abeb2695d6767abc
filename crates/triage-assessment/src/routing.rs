//! Routing assessor: weighted rule lookup with deterministic tie-breaking.

use std::cmp::{Ordering, Reverse};
use std::sync::Arc;

use triage_core::config::RoutingConfig;
use triage_core::constants::{MAX_UNCERTAIN_ROUTING_CONFIDENCE, ROUTING_ASSESSOR};
use triage_core::models::{Assessment, AssessmentPayload, AssessorOutcome, Item, Mode};
use triage_core::traits::IAssessor;
use triage_rules::{CompiledRule, RuleTable};

use crate::malformity;

pub struct RoutingAssessor {
    table: Arc<RuleTable>,
    config: RoutingConfig,
}

impl RoutingAssessor {
    pub fn new(table: Arc<RuleTable>, config: RoutingConfig) -> Self {
        Self { table, config }
    }

    /// Pick the winning rule among matches.
    ///
    /// Rules within `tie_epsilon` of the best weight are tied; ties go to more
    /// reinforcements, then the smallest destination, then the smallest id.
    pub fn select<'a>(&self, matches: &[&'a CompiledRule]) -> Option<&'a CompiledRule> {
        let best = matches
            .iter()
            .map(|r| r.rule.weight)
            .max_by(|a, b| a.total_cmp(b))?;
        matches
            .iter()
            .copied()
            .filter(|r| r.rule.weight >= best - self.config.tie_epsilon)
            .min_by(|a, b| tie_order(a, b))
    }

    fn dampening(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Backfill => self.config.backfill_dampening,
            Mode::Live => 1.0,
        }
    }

    fn uncertain(&self, mode: Mode, rationale: &str) -> Assessment {
        Assessment::new(
            ROUTING_ASSESSOR,
            mode,
            empty_payload(),
            self.config
                .uncertain_confidence
                .min(MAX_UNCERTAIN_ROUTING_CONFIDENCE),
            rationale,
        )
    }
}

fn tie_order(a: &CompiledRule, b: &CompiledRule) -> Ordering {
    let key = |r: &CompiledRule| {
        (
            Reverse(r.rule.reinforcement_count),
            r.rule.destination.clone(),
            r.rule.id.clone(),
        )
    };
    key(a).cmp(&key(b))
}

fn empty_payload() -> AssessmentPayload {
    AssessmentPayload::Routing {
        destination: None,
        destination_kind: None,
        rule_id: None,
        matched: 0,
    }
}

impl IAssessor for RoutingAssessor {
    fn name(&self) -> &str {
        ROUTING_ASSESSOR
    }

    fn required_in(&self, _mode: Mode) -> bool {
        true
    }

    fn evaluate(&self, item: &Item, mode: Mode) -> AssessorOutcome {
        if let Some(problem) = malformity(item) {
            return AssessorOutcome::Assessed(self.fallback(mode, &problem));
        }

        let hashtags = item.hashtags();
        let matches: Vec<&CompiledRule> = self
            .table
            .rules()
            .iter()
            .filter(|r| r.matches(&item.content, &hashtags))
            .collect();

        let Some(rule) = self.select(&matches) else {
            tracing::debug!(item_id = %item.id, "no routing rule matched");
            return AssessorOutcome::Assessed(self.uncertain(mode, "no routing rule matched"));
        };
        if matches.len() > 1 {
            tracing::trace!(
                item_id = %item.id,
                candidates = matches.len(),
                selected = rule.id(),
                "routing candidates resolved"
            );
        }

        let dampening = self.dampening(mode);
        let confidence = rule.rule.weight * dampening;
        let rationale = if dampening < 1.0 {
            format!(
                "rule '{}' -> {} (weight {:.3}, {} dampening {:.2}, {} candidate(s))",
                rule.rule.id,
                rule.rule.destination,
                rule.rule.weight,
                mode,
                dampening,
                matches.len()
            )
        } else {
            format!(
                "rule '{}' -> {} (weight {:.3}, {} candidate(s))",
                rule.rule.id,
                rule.rule.destination,
                rule.rule.weight,
                matches.len()
            )
        };

        AssessorOutcome::Assessed(Assessment::new(
            ROUTING_ASSESSOR,
            mode,
            AssessmentPayload::Routing {
                destination: Some(rule.rule.destination.clone()),
                destination_kind: Some(rule.rule.destination_kind),
                rule_id: Some(rule.rule.id.clone()),
                matched: matches.len(),
            },
            confidence,
            rationale,
        ))
    }

    fn fallback(&self, mode: Mode, rationale: &str) -> Assessment {
        Assessment::new(ROUTING_ASSESSOR, mode, empty_payload(), 0.0, rationale)
    }
}
