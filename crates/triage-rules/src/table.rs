//! Immutable compiled rule table.

use std::path::Path;

use triage_core::errors::RuleError;
use triage_core::models::RuleWeight;

use crate::compiled::CompiledRule;
use crate::document::RuleDocument;
use crate::lexicon::Lexicon;

/// Urgency vocabulary, compiled.
#[derive(Debug, Clone, Default)]
pub struct UrgencyTable {
    pub immediate: Lexicon,
    pub today: Lexicon,
    pub this_week: Lexicon,
    pub action_verbs: Lexicon,
}

/// Excitement vocabulary, compiled.
#[derive(Debug, Clone, Default)]
pub struct ExcitementTable {
    pub novelty: Lexicon,
    pub tags: Lexicon,
}

/// One consistent generation of routing rules and classification vocabulary.
///
/// Tables are never mutated in place: weight overlays and reloads build a new
/// table that the [`crate::RuleStore`] publishes under a new version.
#[derive(Debug, Clone)]
pub struct RuleTable {
    version: u64,
    document_hash: String,
    rules: Vec<CompiledRule>,
    urgency: UrgencyTable,
    excitement: ExcitementTable,
}

impl RuleTable {
    /// Parse and validate a rule document. The table is unversioned (0) until installed.
    pub fn parse(text: &str) -> Result<Self, RuleError> {
        let doc: RuleDocument = toml::from_str(text).map_err(|e| RuleError::Syntax {
            reason: e.to_string(),
        })?;

        let mut rules: Vec<CompiledRule> = Vec::with_capacity(doc.route.len());
        for def in doc.route {
            if def.enabled == Some(false) {
                continue;
            }
            if rules.iter().any(|r| r.id() == def.id) {
                return Err(RuleError::DuplicateRule { rule_id: def.id });
            }
            rules.push(CompiledRule::compile(def)?);
        }

        let urgency = UrgencyTable {
            immediate: Lexicon::compile("urgency.immediate", &doc.urgency.immediate)?,
            today: Lexicon::compile("urgency.today", &doc.urgency.today)?,
            this_week: Lexicon::compile("urgency.this_week", &doc.urgency.this_week)?,
            action_verbs: Lexicon::compile("urgency.action_verbs", &doc.urgency.action_verbs)?,
        };
        let excitement = ExcitementTable {
            novelty: Lexicon::compile("excitement.novelty", &doc.excitement.novelty)?,
            tags: Lexicon::compile("excitement.tags", &doc.excitement.tags)?,
        };

        Ok(Self {
            version: 0,
            document_hash: blake3::hash(text.as_bytes()).to_hex().to_string(),
            rules,
            urgency,
            excitement,
        })
    }

    /// Read and parse a rule document from disk.
    pub fn load(path: &Path) -> Result<Self, RuleError> {
        let text = std::fs::read_to_string(path).map_err(|e| RuleError::Unreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::parse(&text)
    }

    pub(crate) fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    /// Copy of this table with calibrated weights laid over document weights.
    /// Overlays for rules no longer in the document are ignored.
    pub fn with_weights(&self, overlays: &[RuleWeight]) -> Self {
        let mut next = self.clone();
        for overlay in overlays {
            match next.rules.iter_mut().find(|r| r.id() == overlay.rule_id) {
                Some(compiled) => {
                    compiled.rule.weight = overlay.weight.clamp(0.0, 1.0);
                    compiled.rule.reinforcement_count = overlay.reinforcement_count;
                    compiled.rule.provenance = overlay.provenance.clone();
                }
                None => {
                    tracing::debug!(rule_id = %overlay.rule_id, "weight overlay for unknown rule ignored");
                }
            }
        }
        next
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// blake3 hash of the source document.
    pub fn document_hash(&self) -> &str {
        &self.document_hash
    }

    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.id() == id)
    }

    pub fn urgency(&self) -> &UrgencyTable {
        &self.urgency
    }

    pub fn excitement(&self) -> &ExcitementTable {
        &self.excitement
    }
}
