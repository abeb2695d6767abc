//! Versioned holder of the current rule table.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use triage_core::errors::RuleError;
use triage_core::models::RuleWeight;

use crate::table::RuleTable;

/// Publishes rule tables by swapping an `Arc` under a short write lock.
///
/// Readers clone the `Arc` and keep a consistent table for as long as they
/// need it; writers build the next table off to the side. Every publish gets
/// a strictly larger version.
pub struct RuleStore {
    current: RwLock<Arc<RuleTable>>,
    next_version: AtomicU64,
}

impl RuleStore {
    /// Start serving `table` as version 1.
    pub fn new(table: RuleTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table.with_version(1))),
            next_version: AtomicU64::new(2),
        }
    }

    /// Parse a document and serve it. Fatal on any rule error.
    pub fn from_document(text: &str) -> Result<Self, RuleError> {
        RuleTable::parse(text).map(Self::new)
    }

    pub fn load(path: &Path) -> Result<Self, RuleError> {
        RuleTable::load(path).map(Self::new)
    }

    /// Current table.
    pub fn snapshot(&self) -> Result<Arc<RuleTable>, RuleError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&guard))
            .map_err(|_| RuleError::StorePoisoned)
    }

    pub fn version(&self) -> Result<u64, RuleError> {
        self.snapshot().map(|t| t.version())
    }

    /// Publish a new table. Returns its version.
    pub fn install(&self, table: RuleTable) -> Result<u64, RuleError> {
        let mut guard = self.current.write().map_err(|_| RuleError::StorePoisoned)?;
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        *guard = Arc::new(table.with_version(version));
        Ok(version)
    }

    /// Lay calibrated weights over the current table and publish the result.
    pub fn apply_weights(&self, overlays: &[RuleWeight]) -> Result<u64, RuleError> {
        let mut guard = self.current.write().map_err(|_| RuleError::StorePoisoned)?;
        let next = guard.with_weights(overlays);
        let version = self.next_version.fetch_add(1, Ordering::SeqCst);
        *guard = Arc::new(next.with_version(version));
        Ok(version)
    }

    /// Re-read the document at `path`, overlay `weights`, and publish.
    /// On any error the current table stays in service.
    pub fn reload(&self, path: &Path, weights: &[RuleWeight]) -> Result<u64, RuleError> {
        let table = RuleTable::load(path)?.with_weights(weights);
        self.install(table)
    }

    /// Same as [`Self::reload`] from an in-memory document.
    pub fn reload_from_str(&self, text: &str, weights: &[RuleWeight]) -> Result<u64, RuleError> {
        let table = RuleTable::parse(text)?.with_weights(weights);
        self.install(table)
    }
}
