//! Writes routed items as markdown notes under a root directory.

use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use triage_core::errors::ExecutionError;
use triage_core::models::{Action, DestinationKind};
use triage_core::traits::{ExecutionReceipt, ExecutionRequest, IActionExecutor};

/// Subdirectory holding surfaced items awaiting review.
pub const REVIEW_DIR: &str = "review";

/// Knowledge-base, archive and review-queue writer.
///
/// Store requests land at `<root>/<destination>/<item id>.md`, surfaced items
/// at `<root>/review/<item id>.md`. Writes go through a temporary file and a
/// rename, so re-executing a request replaces the note whole.
#[derive(Debug, Clone)]
pub struct FilesystemExecutor {
    root: PathBuf,
    kinds: Vec<DestinationKind>,
}

impl FilesystemExecutor {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            kinds: vec![
                DestinationKind::KnowledgeBase,
                DestinationKind::Archive,
                DestinationKind::ReviewQueue,
            ],
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target_dir(&self, request: &ExecutionRequest) -> Result<PathBuf, ExecutionError> {
        if request.action == Action::Surface {
            return Ok(self.root.join(REVIEW_DIR));
        }
        let destination = request
            .destination
            .as_deref()
            .ok_or_else(|| ExecutionError::Rejected {
                reason: "store request without a destination".to_string(),
            })?;
        let relative = Path::new(destination);
        let safe = !destination.trim().is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(ExecutionError::Rejected {
                reason: format!("destination '{destination}' is not a relative path"),
            });
        }
        Ok(self.root.join(relative))
    }
}

impl IActionExecutor for FilesystemExecutor {
    fn kinds(&self) -> &[DestinationKind] {
        &self.kinds
    }

    fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionReceipt, ExecutionError> {
        let dir = self.target_dir(request)?;
        fs::create_dir_all(&dir).map_err(transient)?;

        let path = dir.join(format!("{}.md", file_stem(&request.item.id)));
        let tmp = dir.join(format!(".{}.tmp", uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&tmp).map_err(transient)?;
        file.write_all(render_note(request).as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(transient)?;
        fs::rename(&tmp, &path).map_err(transient)?;

        Ok(ExecutionReceipt {
            location: path.display().to_string(),
        })
    }
}

fn transient(e: std::io::Error) -> ExecutionError {
    ExecutionError::Transient {
        reason: e.to_string(),
    }
}

/// Item ids become file names; anything outside `[A-Za-z0-9_-]` is replaced.
fn file_stem(item_id: &str) -> String {
    let stem: String = item_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "unnamed".to_string()
    } else {
        stem
    }
}

fn render_note(request: &ExecutionRequest) -> String {
    let item = &request.item;
    let mut note = String::from("---\n");
    note.push_str(&format!("item: {}\n", item.id));
    note.push_str(&format!("action: {}\n", request.action));
    if let Some(dest) = &request.destination {
        let key = if request.action == Action::Surface { "suggested" } else { "destination" };
        note.push_str(&format!("{key}: {dest}\n"));
    }
    note.push_str(&format!("decision_seq: {}\n", request.decision_seq));
    if let Some(captured) = item.captured_at {
        note.push_str(&format!("captured_at: {}\n", captured.to_rfc3339()));
    }
    let tags = item.hashtags();
    if !tags.is_empty() {
        note.push_str(&format!("tags: [{}]\n", tags.join(", ")));
    }
    if let Some(content_ref) = &item.content_ref {
        note.push_str(&format!("attachment: {content_ref}\n"));
    }
    note.push_str("---\n\n");
    note.push_str(item.content.trim_end());
    note.push('\n');
    note
}
