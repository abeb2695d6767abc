//! Urgency assessor. Live items only; backfill content is non-urgent by construction.

use std::sync::Arc;

use triage_core::config::UrgencyConfig;
use triage_core::constants::{URGENCY_ASSESSOR, URGENCY_SIGNAL_KINDS};
use triage_core::models::{Assessment, AssessmentPayload, AssessorOutcome, Item, Mode, UrgencyLevel};
use triage_core::traits::IAssessor;
use triage_rules::RuleTable;

use crate::deadline::{deadline_level, find_deadlines};
use crate::malformity;

const LEXICON_SIGNAL: &str = "lexicon";
const DEADLINE_SIGNAL: &str = "deadline";
const ACTION_VERB_SIGNAL: &str = "action_verb";

pub struct UrgencyAssessor {
    table: Arc<RuleTable>,
    config: UrgencyConfig,
}

impl UrgencyAssessor {
    pub fn new(table: Arc<RuleTable>, config: UrgencyConfig) -> Self {
        Self { table, config }
    }

    fn lexicon_level(&self, content: &str) -> Option<UrgencyLevel> {
        let vocab = self.table.urgency();
        if vocab.immediate.contains_match(content) {
            Some(UrgencyLevel::Immediate)
        } else if vocab.today.contains_match(content) {
            Some(UrgencyLevel::Today)
        } else if vocab.this_week.contains_match(content) {
            Some(UrgencyLevel::ThisWeek)
        } else {
            None
        }
    }

    fn deadline_level(&self, item: &Item) -> Option<UrgencyLevel> {
        let captured = item.captured_at?;
        find_deadlines(&item.content)
            .into_iter()
            .filter_map(|d| deadline_level(d, captured))
            .max_by_key(|level| level.rank())
    }
}

impl IAssessor for UrgencyAssessor {
    fn name(&self) -> &str {
        URGENCY_ASSESSOR
    }

    fn required_in(&self, mode: Mode) -> bool {
        mode == Mode::Live
    }

    /// Lexicon and deadline signals each name a level; the most urgent wins.
    /// An action verb corroborates whatever level was found, or implies
    /// this-week on its own. Confidence is the share of signal kinds that
    /// agree with the chosen level.
    fn evaluate(&self, item: &Item, mode: Mode) -> AssessorOutcome {
        if mode == Mode::Backfill {
            return AssessorOutcome::Skip {
                assessor: URGENCY_ASSESSOR.to_string(),
                reason: "backfill content is never urgent".to_string(),
            };
        }
        if let Some(problem) = malformity(item) {
            return AssessorOutcome::Assessed(self.fallback(mode, &problem));
        }

        let lexicon = self.lexicon_level(&item.content);
        let deadline = self.deadline_level(item);
        let has_verb = self.table.urgency().action_verbs.contains_match(&item.content);

        let level = match lexicon.into_iter().chain(deadline).max_by_key(|l| l.rank()) {
            Some(level) => level,
            None if has_verb => UrgencyLevel::ThisWeek,
            None => {
                return AssessorOutcome::Assessed(Assessment::new(
                    URGENCY_ASSESSOR,
                    mode,
                    AssessmentPayload::Urgency {
                        level: UrgencyLevel::Whenever,
                        signals: Vec::new(),
                    },
                    self.config.quiet_confidence,
                    "no urgency signal",
                ));
            }
        };

        let mut signals = Vec::new();
        if lexicon == Some(level) {
            signals.push(LEXICON_SIGNAL.to_string());
        }
        if deadline == Some(level) {
            signals.push(DEADLINE_SIGNAL.to_string());
        }
        if has_verb {
            signals.push(ACTION_VERB_SIGNAL.to_string());
        }
        let confidence = signals.len() as f64 / URGENCY_SIGNAL_KINDS as f64;
        let rationale = format!("{} from {}", level.as_str(), signals.join(" + "));

        AssessorOutcome::Assessed(Assessment::new(
            URGENCY_ASSESSOR,
            mode,
            AssessmentPayload::Urgency { level, signals },
            confidence,
            rationale,
        ))
    }

    fn fallback(&self, mode: Mode, rationale: &str) -> Assessment {
        Assessment::new(
            URGENCY_ASSESSOR,
            mode,
            AssessmentPayload::Urgency {
                level: UrgencyLevel::Whenever,
                signals: Vec::new(),
            },
            0.0,
            rationale,
        )
    }
}
