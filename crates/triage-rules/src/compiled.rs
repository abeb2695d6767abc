//! A routing rule with its matchers compiled.

use regex::Regex;

use triage_core::errors::RuleError;
use triage_core::models::{RoutingRule, RuleMatcher};

use crate::document::RouteDef;
use crate::lexicon::Lexicon;

/// A [`RoutingRule`] ready for matching.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub rule: RoutingRule,
    keywords: Lexicon,
    pattern: Option<Regex>,
}

impl CompiledRule {
    /// Validate and compile one route definition.
    pub fn compile(def: RouteDef) -> Result<Self, RuleError> {
        if def.id.trim().is_empty() {
            return Err(RuleError::Syntax {
                reason: "route with an empty id".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&def.weight) {
            return Err(RuleError::WeightOutOfRange {
                rule_id: def.id,
                weight: def.weight,
            });
        }

        let keywords = Lexicon::compile(&def.id, &def.keywords)?;
        let pattern = match def.pattern.as_deref().map(str::trim) {
            Some(p) if !p.is_empty() => Some(Regex::new(p).map_err(|e| {
                RuleError::InvalidPattern {
                    rule_id: def.id.clone(),
                    reason: e.to_string(),
                }
            })?),
            _ => None,
        };
        if keywords.is_empty() && pattern.is_none() {
            return Err(RuleError::EmptyMatcher { rule_id: def.id });
        }

        Ok(Self {
            rule: RoutingRule {
                id: def.id,
                destination: def.destination,
                destination_kind: def.kind,
                matcher: RuleMatcher {
                    keywords: def.keywords,
                    pattern: def.pattern,
                },
                weight: def.weight,
                reinforcement_count: 0,
                provenance: Vec::new(),
            },
            keywords,
            pattern,
        })
    }

    pub fn id(&self) -> &str {
        &self.rule.id
    }

    /// Number of matcher hits: keywords found in the content or equal to a
    /// hashtag, plus one for the pattern. Zero means no match.
    pub fn hits(&self, content: &str, hashtags: &[String]) -> usize {
        let content_hits = self.keywords.hits(content);
        let tag_hits = hashtags
            .iter()
            .filter(|tag| {
                self.keywords.contains_term(tag) && !content_hits.contains(&tag.as_str())
            })
            .count();
        let mut hits = content_hits.len() + tag_hits;
        if self.pattern.as_ref().is_some_and(|re| re.is_match(content)) {
            hits += 1;
        }
        hits
    }

    pub fn matches(&self, content: &str, hashtags: &[String]) -> bool {
        self.hits(content, hashtags) > 0
    }
}
