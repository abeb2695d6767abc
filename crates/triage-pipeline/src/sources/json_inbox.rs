use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use triage_core::errors::{PipelineError, TriageResult};
use triage_core::models::{Item, TagState};
use triage_core::traits::IItemSource;

use super::{apply_transition, select_tagged};

/// Inbox kept as a JSON array of items in one file.
///
/// Tag transitions rewrite the whole file through a temporary sibling and a
/// rename, so a crash mid-write leaves the previous version intact.
#[derive(Debug)]
pub struct JsonInboxSource {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonInboxSource {
    /// Open an existing inbox file.
    pub fn open(path: &Path) -> TriageResult<Self> {
        let source = Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        };
        source.read_all()?;
        Ok(source)
    }

    /// Create (or replace) an inbox file holding `items`.
    pub fn create(path: &Path, items: &[Item]) -> TriageResult<Self> {
        let source = Self {
            path: path.to_path_buf(),
            write_lock: Mutex::new(()),
        };
        source.write_all(items)?;
        Ok(source)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn read_all(&self) -> TriageResult<Vec<Item>> {
        let raw = fs::read_to_string(&self.path)
            .map_err(|e| source_err(format!("cannot read {}: {e}", self.path.display())))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&raw)?)
    }

    fn write_all(&self, items: &[Item]) -> TriageResult<()> {
        let json = serde_json::to_vec_pretty(items)?;
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let tmp = dir.join(format!(".inbox-{}.tmp", uuid::Uuid::new_v4()));
        let written = fs::File::create(&tmp)
            .and_then(|mut file| {
                file.write_all(&json)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp, &self.path));
        if let Err(e) = written {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                tracing::debug!(path = %tmp.display(), error = %cleanup, "temporary inbox not removed");
            }
            return Err(source_err(format!("cannot write {}: {e}", self.path.display())));
        }
        Ok(())
    }
}

impl IItemSource for JsonInboxSource {
    fn fetch_unprocessed(&self, limit: usize) -> TriageResult<Vec<Item>> {
        Ok(select_tagged(&self.read_all()?, TagState::Unprocessed, limit))
    }

    fn fetch_claimed(&self, limit: usize) -> TriageResult<Vec<Item>> {
        Ok(select_tagged(&self.read_all()?, TagState::Processing, limit))
    }

    fn item(&self, item_id: &str) -> TriageResult<Option<Item>> {
        Ok(self.read_all()?.into_iter().find(|i| i.id == item_id))
    }

    fn transition(&self, item_id: &str, from: TagState, to: TagState) -> TriageResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| source_err("inbox write lock poisoned".to_string()))?;
        let mut items = self.read_all()?;
        apply_transition(&mut items, item_id, from, to)?;
        self.write_all(&items)
    }
}

fn source_err(reason: String) -> triage_core::TriageError {
    PipelineError::ItemSource { reason }.into()
}
