//! Phrase lists compiled to word-boundary matchers.

use regex::Regex;

use triage_core::errors::RuleError;

/// Case-insensitive whole-word phrase matcher.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    terms: Vec<(String, Regex)>,
}

impl Lexicon {
    /// Compile a phrase list. `owner` names the rule or section in errors.
    pub fn compile(owner: &str, phrases: &[String]) -> Result<Self, RuleError> {
        let mut terms = Vec::with_capacity(phrases.len());
        for phrase in phrases {
            let phrase = phrase.trim().to_lowercase();
            if phrase.is_empty() {
                continue;
            }
            if terms.iter().any(|(t, _)| *t == phrase) {
                continue;
            }
            let regex = phrase_regex(&phrase).map_err(|e| RuleError::InvalidPattern {
                rule_id: owner.to_string(),
                reason: e.to_string(),
            })?;
            terms.push((phrase, regex));
        }
        Ok(Self { terms })
    }

    /// Phrases found in `text`, in lexicon order.
    pub fn hits<'a>(&'a self, text: &str) -> Vec<&'a str> {
        self.terms
            .iter()
            .filter(|(_, re)| re.is_match(text))
            .map(|(t, _)| t.as_str())
            .collect()
    }

    pub fn contains_match(&self, text: &str) -> bool {
        self.terms.iter().any(|(_, re)| re.is_match(text))
    }

    /// Whether a single label equals one of the phrases.
    pub fn contains_term(&self, label: &str) -> bool {
        let label = label.trim_start_matches('#').to_lowercase();
        self.terms.iter().any(|(t, _)| *t == label)
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }
}

/// `\b` only anchors on word characters; phrases that start or end with
/// punctuation fall back to whitespace/edge anchors.
fn phrase_regex(phrase: &str) -> Result<Regex, regex::Error> {
    let escaped = regex::escape(phrase);
    let starts_word = phrase.chars().next().is_some_and(|c| c.is_alphanumeric() || c == '_');
    let ends_word = phrase.chars().last().is_some_and(|c| c.is_alphanumeric() || c == '_');
    let head = if starts_word { r"\b" } else { r"(?:^|\s)" };
    let tail = if ends_word { r"\b" } else { r"(?:$|\s)" };
    Regex::new(&format!("(?i){head}{escaped}{tail}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(words: &[&str]) -> Lexicon {
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        Lexicon::compile("test", &words).unwrap()
    }

    #[test]
    fn matches_whole_words_only() {
        let l = lex(&["call"]);
        assert!(l.contains_match("Call the plumber"));
        assert!(!l.contains_match("recall the details"));
    }

    #[test]
    fn multi_word_phrases_and_duplicates() {
        let l = lex(&["this week", "THIS WEEK", ""]);
        assert_eq!(l.len(), 1);
        assert_eq!(l.hits("due this week!"), vec!["this week"]);
    }

    #[test]
    fn punctuation_phrases_use_whitespace_anchors() {
        let l = lex(&["c++"]);
        assert!(l.contains_match("notes on c++ templates"));
        assert!(!l.contains_match("notes on c++x"));
    }

    #[test]
    fn label_lookup_ignores_hash_and_case() {
        let l = lex(&["idea"]);
        assert!(l.contains_term("#Idea"));
        assert!(!l.contains_term("ideas"));
    }
}
