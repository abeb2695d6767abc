use std::sync::{Mutex, MutexGuard};

use triage_core::errors::{PipelineError, TriageResult};
use triage_core::models::{Item, TagState};
use triage_core::traits::IItemSource;

use super::{apply_transition, select_tagged};

/// In-process inbox, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryItemSource {
    items: Mutex<Vec<Item>>,
}

impl MemoryItemSource {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            items: Mutex::new(items),
        }
    }

    fn lock(&self) -> TriageResult<MutexGuard<'_, Vec<Item>>> {
        self.items.lock().map_err(|_| {
            PipelineError::ItemSource {
                reason: "inbox lock poisoned".to_string(),
            }
            .into()
        })
    }

    pub fn push(&self, item: Item) -> TriageResult<()> {
        self.lock()?.push(item);
        Ok(())
    }

    pub fn tag_of(&self, item_id: &str) -> Option<TagState> {
        self.lock()
            .ok()?
            .iter()
            .find(|i| i.id == item_id)
            .map(|i| i.tag)
    }

    pub fn items(&self) -> Vec<Item> {
        self.lock().map(|items| items.clone()).unwrap_or_default()
    }
}

impl IItemSource for MemoryItemSource {
    fn fetch_unprocessed(&self, limit: usize) -> TriageResult<Vec<Item>> {
        Ok(select_tagged(&self.lock()?, TagState::Unprocessed, limit))
    }

    fn fetch_claimed(&self, limit: usize) -> TriageResult<Vec<Item>> {
        Ok(select_tagged(&self.lock()?, TagState::Processing, limit))
    }

    fn item(&self, item_id: &str) -> TriageResult<Option<Item>> {
        Ok(self.lock()?.iter().find(|i| i.id == item_id).cloned())
    }

    fn transition(&self, item_id: &str, from: TagState, to: TagState) -> TriageResult<()> {
        apply_transition(&mut self.lock()?, item_id, from, to)?;
        Ok(())
    }
}
