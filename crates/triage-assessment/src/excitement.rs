//! Excitement assessor: novelty and interest, dampened for aged content.

use std::sync::Arc;

use triage_core::config::ExcitementConfig;
use triage_core::constants::EXCITEMENT_ASSESSOR;
use triage_core::models::{Assessment, AssessmentPayload, AssessorOutcome, Item, Mode};
use triage_core::traits::IAssessor;
use triage_rules::RuleTable;

use crate::malformity;

const NOVELTY_TERM_SCORE: f64 = 0.25;
const EXCLAMATION_SCORE: f64 = 0.1;
const TAG_SCORE: f64 = 0.15;

pub struct ExcitementAssessor {
    table: Arc<RuleTable>,
    config: ExcitementConfig,
}

impl ExcitementAssessor {
    pub fn new(table: Arc<RuleTable>, config: ExcitementConfig) -> Self {
        Self { table, config }
    }

    /// Undampened score in [0, 1].
    pub fn raw_score(&self, item: &Item) -> f64 {
        let vocab = self.table.excitement();
        let novelty = vocab.novelty.hits(&item.content).len() as f64;
        let exclaims = item.content.contains('!');
        let tagged = item.hashtags().iter().any(|t| vocab.tags.contains_term(t));

        let mut score = self.config.base_score + novelty * NOVELTY_TERM_SCORE;
        if exclaims {
            score += EXCLAMATION_SCORE;
        }
        if tagged {
            score += TAG_SCORE;
        }
        score.clamp(0.0, 1.0)
    }
}

impl IAssessor for ExcitementAssessor {
    fn name(&self) -> &str {
        EXCITEMENT_ASSESSOR
    }

    fn required_in(&self, _mode: Mode) -> bool {
        true
    }

    fn evaluate(&self, item: &Item, mode: Mode) -> AssessorOutcome {
        if let Some(problem) = malformity(item) {
            return AssessorOutcome::Assessed(self.fallback(mode, &problem));
        }

        let raw = self.raw_score(item);
        let (score, rationale) = match mode {
            Mode::Backfill => {
                let damp = self.config.backfill_dampening;
                (raw * damp, format!("score {raw:.3} dampened x{damp:.2} for backfill"))
            }
            Mode::Live => (raw, format!("score {raw:.3}")),
        };

        AssessorOutcome::Assessed(Assessment::new(
            EXCITEMENT_ASSESSOR,
            mode,
            AssessmentPayload::Excitement { score },
            score,
            rationale,
        ))
    }

    fn fallback(&self, mode: Mode, rationale: &str) -> Assessment {
        Assessment::new(
            EXCITEMENT_ASSESSOR,
            mode,
            AssessmentPayload::Excitement { score: 0.0 },
            0.0,
            rationale,
        )
    }
}
