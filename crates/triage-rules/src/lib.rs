//! # triage-rules
//!
//! Human-edited rule documents (TOML) compiled into an immutable [`RuleTable`],
//! published through a versioned [`RuleStore`]. Readers take an `Arc` snapshot
//! and never observe a half-applied update.

pub mod compiled;
pub mod document;
pub mod lexicon;
pub mod store;
pub mod table;

pub use compiled::CompiledRule;
pub use document::{ExcitementLexicon, RouteDef, RuleDocument, UrgencyLexicon};
pub use lexicon::Lexicon;
pub use store::RuleStore;
pub use table::{ExcitementTable, RuleTable, UrgencyTable};
