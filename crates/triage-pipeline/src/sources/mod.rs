//! Built-in inbox adapters.

mod json_inbox;
mod memory;

pub use json_inbox::JsonInboxSource;
pub use memory::MemoryItemSource;

use triage_core::errors::PipelineError;
use triage_core::models::{Item, TagState};

/// Items carrying `tag`, oldest capture first; items without a capture time last.
pub(crate) fn select_tagged(items: &[Item], tag: TagState, limit: usize) -> Vec<Item> {
    let mut pending: Vec<&Item> = items.iter().filter(|i| i.tag == tag).collect();
    pending.sort_by_key(|i| (i.captured_at.is_none(), i.captured_at));
    pending.into_iter().take(limit).cloned().collect()
}

/// Move one item's tag, checking the expected current state.
pub(crate) fn apply_transition(
    items: &mut [Item],
    item_id: &str,
    from: TagState,
    to: TagState,
) -> Result<(), PipelineError> {
    let item = items
        .iter_mut()
        .find(|i| i.id == item_id)
        .ok_or_else(|| PipelineError::ItemNotFound {
            item_id: item_id.to_string(),
        })?;
    if item.tag != from || !from.can_transition_to(to) {
        return Err(PipelineError::InvalidTransition {
            item_id: item_id.to_string(),
            from: item.tag.to_string(),
            to: to.to_string(),
        });
    }
    item.tag = to;
    Ok(())
}
