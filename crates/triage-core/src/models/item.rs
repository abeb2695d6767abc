use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Kind of captured content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    #[default]
    Note,
    File,
    VoiceTranscript,
    Email,
    Other,
}

/// Metadata supplied by whatever captured the item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceMetadata {
    /// Arrived as part of a bulk import.
    pub batch_import: bool,
    /// Explicitly marked as historical by the capturing tool.
    pub historical: bool,
    /// Free-form origin label ("email", "voice", "share-sheet").
    pub origin: Option<String>,
}

/// Processing tag held by the inbox application.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagState {
    #[default]
    Unprocessed,
    Processing,
    Done,
}

impl TagState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unprocessed => "unprocessed",
            Self::Processing => "processing",
            Self::Done => "done",
        }
    }

    /// Forward transitions plus the rollback used when an item is not committed.
    pub fn can_transition_to(self, to: TagState) -> bool {
        matches!(
            (self, to),
            (Self::Unprocessed, Self::Processing)
                | (Self::Processing, Self::Done)
                | (Self::Processing, Self::Unprocessed)
        )
    }
}

impl std::fmt::Display for TagState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A captured personal-knowledge item awaiting routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    /// Text payload (note body, transcript, extracted file text).
    pub content: String,
    /// Reference to an attachment held by the inbox application.
    #[serde(default)]
    pub content_ref: Option<String>,
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default)]
    pub captured_at: Option<DateTime<Utc>>,
    /// When the content was originally written, if known.
    #[serde(default)]
    pub authored_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub source: SourceMetadata,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub tag: TagState,
}

impl Item {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            content_ref: None,
            content_type: ContentType::Note,
            captured_at: None,
            authored_at: None,
            source: SourceMetadata::default(),
            labels: Vec::new(),
            tag: TagState::Unprocessed,
        }
    }

    /// How much older the authored timestamp is than the capture timestamp.
    pub fn original_age(&self) -> Option<Duration> {
        match (self.captured_at, self.authored_at) {
            (Some(captured), Some(authored)) => Some(captured - authored),
            _ => None,
        }
    }

    /// Explicit labels plus `#hashtags` found in the content, lowercased, sorted, deduplicated.
    pub fn hashtags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self
            .labels
            .iter()
            .map(|l| l.trim_start_matches('#').to_lowercase())
            .filter(|l| !l.is_empty())
            .collect();

        for token in self.content.split_whitespace() {
            let Some(rest) = token.strip_prefix('#') else {
                continue;
            };
            let tag: String = rest
                .chars()
                .take_while(|c| c.is_alphanumeric() || *c == '-' || *c == '_' || *c == '/')
                .collect();
            if !tag.is_empty() {
                tags.push(tag.to_lowercase());
            }
        }

        tags.sort();
        tags.dedup();
        tags
    }

    /// Every missing or inconsistent field. Empty means well-formed.
    pub fn validate(&self) -> Vec<ItemProblem> {
        let mut problems = Vec::new();
        if self.id.trim().is_empty() {
            problems.push(ItemProblem::EmptyId);
        }
        if self.content.trim().is_empty() && self.content_ref.is_none() {
            problems.push(ItemProblem::NoContent);
        }
        if self.captured_at.is_none() {
            problems.push(ItemProblem::MissingCaptureTime);
        }
        if let (Some(captured), Some(authored)) = (self.captured_at, self.authored_at) {
            if authored > captured {
                problems.push(ItemProblem::AuthoredAfterCapture);
            }
        }
        problems
    }
}

/// A reason an item is not well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ItemProblem {
    #[error("item id is empty")]
    EmptyId,
    #[error("item has no content")]
    NoContent,
    #[error("capture timestamp is missing")]
    MissingCaptureTime,
    #[error("authored timestamp is after capture")]
    AuthoredAfterCapture,
}

impl ItemProblem {
    /// Leaves an assessor with nothing to evaluate, as opposed to metadata
    /// it can work around.
    pub fn blocks_assessment(self) -> bool {
        matches!(self, Self::EmptyId | Self::NoContent)
    }
}
