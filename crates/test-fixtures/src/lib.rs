//! Shared fixtures for triage tests: sample rule document and inbox, item and
//! decision builders, scripted doubles for every seam in `triage_core::traits`.

pub mod builders;
pub mod doubles;

use serde::de::DeserializeOwned;
use std::path::PathBuf;

pub use builders::*;
pub use doubles::*;

/// Rule document exercised by most tests.
pub const SAMPLE_RULES: &str = include_str!("../data/rules.toml");

/// Directory holding the fixture data files.
pub fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

/// Absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixture_path(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// The sample inbox.
pub fn sample_items() -> Vec<triage_core::Item> {
    load_fixture("items.json")
}
