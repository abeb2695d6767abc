//! Builders for items, assessments and decisions.

use chrono::{DateTime, Duration, TimeZone, Utc};

use triage_core::constants::{EXCITEMENT_ASSESSOR, ROUTING_ASSESSOR, URGENCY_ASSESSOR};
use triage_core::models::{
    Action, Assessment, AssessmentPayload, ContentType, Decision, DecisionBranch,
    DestinationKind, Item, Mode, UrgencyLevel,
};
use triage_core::Confidence;

/// Fixed reference instant so fixture timestamps are reproducible.
pub fn reference_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

/// Fluent item builder. Captured at [`reference_now`] by default.
#[derive(Debug, Clone)]
pub struct ItemBuilder {
    item: Item,
}

impl ItemBuilder {
    pub fn new(id: &str, content: &str) -> Self {
        let mut item = Item::new(id, content);
        item.captured_at = Some(reference_now());
        Self { item }
    }

    pub fn captured_at(mut self, at: DateTime<Utc>) -> Self {
        self.item.captured_at = Some(at);
        self
    }

    pub fn no_capture_time(mut self) -> Self {
        self.item.captured_at = None;
        self
    }

    /// Authored `days` before capture.
    pub fn authored_days_before(mut self, days: i64) -> Self {
        let captured = self.item.captured_at.unwrap_or_else(reference_now);
        self.item.authored_at = Some(captured - Duration::days(days));
        self
    }

    pub fn authored_at(mut self, at: DateTime<Utc>) -> Self {
        self.item.authored_at = Some(at);
        self
    }

    pub fn batch_import(mut self) -> Self {
        self.item.source.batch_import = true;
        self
    }

    pub fn historical(mut self) -> Self {
        self.item.source.historical = true;
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.item.labels.push(label.to_string());
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.item.content_type = content_type;
        self
    }

    pub fn build(self) -> Item {
        self.item
    }
}

/// Freshly captured item.
pub fn live_item(id: &str, content: &str) -> Item {
    ItemBuilder::new(id, content).build()
}

/// Item authored `age_days` before capture.
pub fn aged_item(id: &str, content: &str, age_days: i64) -> Item {
    ItemBuilder::new(id, content)
        .authored_days_before(age_days)
        .build()
}

pub fn routing_assessment(
    mode: Mode,
    rule_id: Option<&str>,
    destination: Option<&str>,
    confidence: f64,
) -> Assessment {
    Assessment::new(
        ROUTING_ASSESSOR,
        mode,
        AssessmentPayload::Routing {
            destination: destination.map(str::to_string),
            destination_kind: destination.map(|_| DestinationKind::KnowledgeBase),
            rule_id: rule_id.map(str::to_string),
            matched: usize::from(rule_id.is_some()),
        },
        confidence,
        "fixture",
    )
}

pub fn urgency_assessment(level: UrgencyLevel, confidence: f64) -> Assessment {
    Assessment::new(
        URGENCY_ASSESSOR,
        Mode::Live,
        AssessmentPayload::Urgency {
            level,
            signals: Vec::new(),
        },
        confidence,
        "fixture",
    )
}

pub fn excitement_assessment(mode: Mode, score: f64) -> Assessment {
    Assessment::new(
        EXCITEMENT_ASSESSOR,
        mode,
        AssessmentPayload::Excitement { score },
        score,
        "fixture",
    )
}

/// A logged-shape decision routed by `rule_id` to `destination`.
pub fn decision(item_id: &str, action: Action, rule_id: &str, destination: &str) -> Decision {
    let mode = Mode::Live;
    let routing = routing_assessment(mode, Some(rule_id), Some(destination), 0.8);
    let excitement = excitement_assessment(mode, 0.1);
    let branch = match action {
        Action::Store => DecisionBranch::AutoStore,
        Action::Surface => DecisionBranch::Ambiguous,
        Action::Discard => DecisionBranch::Discard,
    };
    Decision {
        item_id: item_id.to_string(),
        mode,
        assessments: vec![routing, excitement],
        action,
        confidence: Confidence::new(0.8),
        destination: Some(destination.to_string()),
        destination_kind: Some(DestinationKind::KnowledgeBase),
        rule_id: Some(rule_id.to_string()),
        rule_set_version: 1,
        branch,
        decided_at: reference_now(),
    }
}
