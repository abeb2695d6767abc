//! Declarative rule document, deserialized straight from TOML.

use serde::{Deserialize, Serialize};

use triage_core::models::DestinationKind;

/// One `[[route]]` entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteDef {
    pub id: String,
    pub destination: String,
    pub kind: DestinationKind,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    pub enabled: Option<bool>,
}

fn default_weight() -> f64 {
    0.5
}

/// `[urgency]` vocabulary. Phrases match case-insensitively on word boundaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UrgencyLexicon {
    pub immediate: Vec<String>,
    pub today: Vec<String>,
    pub this_week: Vec<String>,
    pub action_verbs: Vec<String>,
}

impl Default for UrgencyLexicon {
    fn default() -> Self {
        Self {
            immediate: words(&["urgent", "asap", "immediately", "right now", "emergency"]),
            today: words(&["today", "tonight", "tomorrow", "eod", "end of day"]),
            this_week: words(&["this week", "this weekend", "by friday", "in a few days"]),
            action_verbs: words(&[
                "call", "email", "pay", "book", "renew", "submit", "reply", "schedule",
            ]),
        }
    }
}

/// `[excitement]` vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExcitementLexicon {
    pub novelty: Vec<String>,
    /// Labels that mark an item as exciting on their own.
    pub tags: Vec<String>,
}

impl Default for ExcitementLexicon {
    fn default() -> Self {
        Self {
            novelty: words(&["idea", "discovered", "til", "breakthrough", "fascinating"]),
            tags: words(&["idea", "spark"]),
        }
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

/// A whole rule document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleDocument {
    #[serde(default)]
    pub route: Vec<RouteDef>,
    #[serde(default)]
    pub urgency: UrgencyLexicon,
    #[serde(default)]
    pub excitement: ExcitementLexicon,
}
