use crate::errors::TriageResult;
use crate::models::{Item, TagState};

/// Inbox application boundary.
pub trait IItemSource: Send + Sync {
    /// Up to `limit` items tagged `unprocessed`, oldest capture first.
    fn fetch_unprocessed(&self, limit: usize) -> TriageResult<Vec<Item>>;

    /// Up to `limit` items tagged `processing`, oldest capture first. A claim
    /// left behind by a process that died mid-item shows up here.
    fn fetch_claimed(&self, limit: usize) -> TriageResult<Vec<Item>>;

    /// Look one item up by id, whatever its tag.
    fn item(&self, item_id: &str) -> TriageResult<Option<Item>>;

    /// Move an item's tag. Fails if the item is not currently in `from`.
    fn transition(&self, item_id: &str, from: TagState, to: TagState) -> TriageResult<()>;
}
