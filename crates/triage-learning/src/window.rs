//! Folding a window of log entries into weight updates.

use std::collections::BTreeMap;

use chrono::Utc;

use triage_core::models::{
    Action, CorrectionKind, DecisionLogEntry, LogRecord, RuleWeight, WeightDelta,
};

use crate::formula::{bump, decay};

/// Weights and per-rule deltas produced by one window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WindowOutcome {
    /// Updated weights of every rule the window touched, by rule id.
    pub weights: BTreeMap<String, RuleWeight>,
    pub deltas: Vec<WeightDelta>,
    /// Highest sequence number in the window.
    pub last_seq: Option<u64>,
}

enum Update {
    Bump,
    Decay,
}

/// What an entry asks of calibration.
///
/// Store decisions and confirmations of surfaced decisions reinforce the
/// routed rule. Overrides decay it. Confirming a decision that was already
/// stored adds nothing; the store itself was counted.
fn update_for(record: &LogRecord) -> Option<(&str, Update)> {
    match record {
        LogRecord::Decision(d) if d.action == Action::Store => {
            d.rule_id.as_deref().map(|id| (id, Update::Bump))
        }
        LogRecord::Correction(c) => {
            let rule_id = c.rule_id.as_deref()?;
            match c.effective_kind() {
                CorrectionKind::Confirmed if c.original_action != Action::Store => {
                    Some((rule_id, Update::Bump))
                }
                CorrectionKind::Confirmed => None,
                CorrectionKind::Overridden { .. } => Some((rule_id, Update::Decay)),
            }
        }
        _ => None,
    }
}

/// Apply `entries` in sequence order over `seed`.
///
/// `seed` returns the starting state for a rule id, or `None` for rules the
/// current table no longer knows (their entries are skipped). Pure: the same
/// entries and seeds always give the same outcome.
pub fn fold_window<F>(
    entries: &[DecisionLogEntry],
    mut seed: F,
    alpha: f64,
    provenance_cap: usize,
) -> WindowOutcome
where
    F: FnMut(&str) -> Option<RuleWeight>,
{
    let mut ordered: Vec<&DecisionLogEntry> = entries.iter().collect();
    ordered.sort_by_key(|e| e.seq);

    let mut weights: BTreeMap<String, RuleWeight> = BTreeMap::new();
    let mut deltas: BTreeMap<String, WeightDelta> = BTreeMap::new();

    for entry in &ordered {
        let Some((rule_id, update)) = update_for(&entry.record) else {
            continue;
        };
        if !weights.contains_key(rule_id) {
            let Some(start) = seed(rule_id) else {
                tracing::debug!(rule_id, seq = entry.seq, "entry for unknown rule skipped");
                continue;
            };
            deltas.insert(
                rule_id.to_string(),
                WeightDelta {
                    rule_id: rule_id.to_string(),
                    before: start.weight,
                    after: start.weight,
                    bumps: 0,
                    decays: 0,
                },
            );
            weights.insert(rule_id.to_string(), start);
        }
        let (Some(state), Some(delta)) = (weights.get_mut(rule_id), deltas.get_mut(rule_id)) else {
            continue;
        };

        match update {
            Update::Bump => {
                state.weight = bump(state.weight, alpha);
                state.reinforcement_count += 1;
                state.provenance.push(entry.seq);
                if state.provenance.len() > provenance_cap {
                    let excess = state.provenance.len() - provenance_cap;
                    state.provenance.drain(..excess);
                }
                delta.bumps += 1;
            }
            Update::Decay => {
                state.weight = decay(state.weight, alpha);
                delta.decays += 1;
            }
        }
        state.updated_at = Utc::now();
        delta.after = state.weight;
    }

    WindowOutcome {
        weights,
        deltas: deltas.into_values().collect(),
        last_seq: ordered.last().map(|e| e.seq),
    }
}
