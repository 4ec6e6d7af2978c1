// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the OFITEC next-action engine.
//!
//! String forms of every enum match the values persisted in storage and
//! exchanged with the messaging layer, so `Display`/`FromStr` round-trips
//! are part of the contract.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use strum::{Display, EnumString};

/// Opaque provider-assigned identifier for a delivered message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProviderMessageId(pub String);

/// Scope of an analysis run: a single project or the whole portfolio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectScope {
    /// Every project known to the project store.
    All,
    /// A single project by identifier.
    Project(i64),
}

impl ProjectScope {
    /// Whether a record belonging to `project_id` falls inside this scope.
    pub fn includes(self, project_id: i64) -> bool {
        match self {
            ProjectScope::All => true,
            ProjectScope::Project(id) => id == project_id,
        }
    }

    /// The single project id, if this scope names one.
    pub fn project_id(self) -> Option<i64> {
        match self {
            ProjectScope::All => None,
            ProjectScope::Project(id) => Some(id),
        }
    }
}

/// Action priority. Rank 1 is critical; ranks 1-2 are notification-eligible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    Critical,
    High,
    Medium,
    Low,
}

impl Priority {
    /// Numeric rank as persisted: 1 (critical) through 4 (low).
    pub fn rank(self) -> u8 {
        match self {
            Priority::Critical => 1,
            Priority::High => 2,
            Priority::Medium => 3,
            Priority::Low => 4,
        }
    }

    /// Inverse of [`Priority::rank`].
    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Priority::Critical),
            2 => Some(Priority::High),
            3 => Some(Priority::Medium),
            4 => Some(Priority::Low),
            _ => None,
        }
    }

    /// Priority 1-2 actions are eligible for outbound notification.
    pub fn is_notifiable(self) -> bool {
        self.rank() <= 2
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rank())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.rank())
    }
}

impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let rank = u8::deserialize(deserializer)?;
        Priority::from_rank(rank)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid priority rank {rank}")))
    }
}

/// How soon an action should be taken.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Immediate,
    Urgent,
    Planned,
    Preventive,
}

/// Domain a recommendation belongs to.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Risk,
    Financial,
    Operational,
    Quality,
    Communication,
    Planning,
}

/// Lifecycle state of an action.
///
/// Transitions only move forward, except `Cancelled` which is reachable
/// from any non-terminal state. Terminal states accept no transition.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl ActionStatus {
    /// Completed and cancelled actions accept no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionStatus::Completed | ActionStatus::Cancelled)
    }

    /// Whether moving from `self` to `target` is a legal transition.
    ///
    /// Re-applying the current state is legal (idempotent no-op).
    pub fn can_transition_to(self, target: ActionStatus) -> bool {
        if self == target {
            return true;
        }
        match (self, target) {
            (s, ActionStatus::Cancelled) if !s.is_terminal() => true,
            (ActionStatus::Pending, ActionStatus::InProgress) => true,
            (ActionStatus::Pending, ActionStatus::Completed) => true,
            (ActionStatus::InProgress, ActionStatus::Completed) => true,
            _ => false,
        }
    }
}

/// Severity scale shared by risks and incidents.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// High and critical entries drive urgent recommendations.
    pub fn is_severe(self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }
}

/// References back to the domain records that triggered an action.
///
/// An action references exactly one project, or none when it is a
/// portfolio-wide ("general") recommendation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceRef {
    pub project_id: Option<i64>,
    pub risk_id: Option<i64>,
    pub incident_id: Option<i64>,
    pub budget_id: Option<i64>,
}

impl SourceRef {
    pub fn for_project(project_id: i64) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::default()
        }
    }

    /// True when no triggering record is referenced at all.
    pub fn is_general(&self) -> bool {
        self.project_id.is_none()
            && self.risk_id.is_none()
            && self.incident_id.is_none()
            && self.budget_id.is_none()
    }
}

/// A contact resolved for notification delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub name: String,
    /// Deliverable phone handle; recipients without one are skipped.
    pub phone: Option<String>,
}

impl Recipient {
    pub fn new(name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: Some(phone.into()),
        }
    }

    pub fn without_phone(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            phone: None,
        }
    }
}

/// A candidate recommendation produced by a signal collector.
///
/// Drafts are pure data; the aggregator assigns identity and persists
/// them as [`Action`] records with `Pending` status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDraft {
    pub title: String,
    pub description: String,
    pub action_type: ActionType,
    pub priority: Priority,
    pub category: ActionCategory,
    pub source: SourceRef,
    /// Confidence in the recommendation, percent scale (0-100).
    pub confidence_score: f64,
    /// Estimated impact, 0-10 scale.
    pub impact_score: f64,
    /// Estimated urgency, 0-10 scale.
    pub urgency_score: f64,
    pub recommended_actions: String,
    pub expected_benefits: String,
    pub required_resources: String,
    pub suggested_date: NaiveDate,
    pub deadline: Option<NaiveDate>,
    /// Name of the analysis engine that produced the draft.
    pub engine: String,
    /// Responsible user, when one is known at draft time.
    pub assignee: Option<Recipient>,
}

/// A persisted, prioritized recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub action_type: ActionType,
    pub priority: Priority,
    pub category: ActionCategory,
    pub status: ActionStatus,
    pub source: SourceRef,
    pub confidence_score: f64,
    pub impact_score: f64,
    pub urgency_score: f64,
    pub recommended_actions: String,
    pub expected_benefits: String,
    pub required_resources: String,
    pub suggested_date: NaiveDate,
    pub deadline: Option<NaiveDate>,
    pub completed_date: Option<DateTime<Utc>>,
    pub engine: String,
    /// Whether outbound notifications are enabled for this action.
    pub notify_enabled: bool,
    /// Set once at least one recipient delivery succeeded.
    pub notified: bool,
    /// Explicit recipients beyond the project owner and assignee.
    pub recipients: Vec<Recipient>,
    /// Responsible user; notified alongside the other recipients.
    pub assignee: Option<Recipient>,
    pub created_at: DateTime<Utc>,
}

impl Action {
    /// An action is notification-eligible when enabled and priority 1-2.
    pub fn is_notifiable(&self) -> bool {
        self.notify_enabled && self.priority.is_notifiable()
    }
}

/// Direction of a notification message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Inbound,
    Outbound,
}

/// Payload kind of a notification message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Text,
    Template,
    Image,
    Document,
    Audio,
    Video,
    Location,
    Sticker,
}

/// Delivery lifecycle of an outbound message: pending -> sent ->
/// delivered -> read, or failed at any point.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Pending,
    Sent,
    Delivered,
    Read,
    Failed,
}

/// Outbound retries are abandoned once this many attempts were made.
pub const MAX_RETRIES: i64 = 3;

/// One outbound or inbound delivery attempt, kept forever as audit trail.
///
/// Weakly references the [`Action`] it belongs to; deleting the action
/// nulls the reference but never removes the message row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub id: i64,
    pub direction: Direction,
    pub action_id: Option<i64>,
    pub from_phone: Option<String>,
    pub to_phone: Option<String>,
    pub body: String,
    pub message_type: MessageType,
    pub status: DeliveryStatus,
    pub provider_message_id: Option<String>,
    pub retry_count: i64,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub read_at: Option<DateTime<Utc>>,
}

impl NotificationMessage {
    /// A failed outbound message may be retried while under the bound.
    pub fn is_retryable(&self) -> bool {
        self.direction == Direction::Outbound
            && self.status == DeliveryStatus::Failed
            && self.retry_count < MAX_RETRIES
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn priority_rank_round_trip() {
        for rank in 1..=4u8 {
            let p = Priority::from_rank(rank).unwrap();
            assert_eq!(p.rank(), rank);
            assert_eq!(p.to_string(), rank.to_string());
        }
        assert!(Priority::from_rank(0).is_none());
        assert!(Priority::from_rank(5).is_none());
    }

    #[test]
    fn priority_notifiability() {
        assert!(Priority::Critical.is_notifiable());
        assert!(Priority::High.is_notifiable());
        assert!(!Priority::Medium.is_notifiable());
        assert!(!Priority::Low.is_notifiable());
    }

    #[test]
    fn priority_serde_as_rank() {
        let json = serde_json::to_string(&Priority::Critical).unwrap();
        assert_eq!(json, "1");
        let parsed: Priority = serde_json::from_str("2").unwrap();
        assert_eq!(parsed, Priority::High);
        assert!(serde_json::from_str::<Priority>("9").is_err());
    }

    #[test]
    fn status_transitions_forward_only() {
        use ActionStatus::*;

        assert!(Pending.can_transition_to(InProgress));
        assert!(Pending.can_transition_to(Completed));
        assert!(InProgress.can_transition_to(Completed));
        assert!(!InProgress.can_transition_to(Pending));
        assert!(!Completed.can_transition_to(InProgress));

        // Cancelled is reachable from any non-terminal state and terminal.
        assert!(Pending.can_transition_to(Cancelled));
        assert!(InProgress.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));

        // Re-applying the current state is an idempotent no-op.
        assert!(Completed.can_transition_to(Completed));
        assert!(Cancelled.can_transition_to(Cancelled));
    }

    #[test]
    fn enum_string_forms_are_snake_case() {
        assert_eq!(ActionType::Immediate.to_string(), "immediate");
        assert_eq!(ActionStatus::InProgress.to_string(), "in_progress");
        assert_eq!(ActionCategory::Financial.to_string(), "financial");
        assert_eq!(DeliveryStatus::Read.to_string(), "read");
        assert_eq!(
            ActionStatus::from_str("in_progress").unwrap(),
            ActionStatus::InProgress
        );
    }

    #[test]
    fn severity_classification() {
        assert!(Severity::Critical.is_severe());
        assert!(Severity::High.is_severe());
        assert!(!Severity::Medium.is_severe());
        assert!(!Severity::Low.is_severe());
        assert!(Severity::Low < Severity::Critical);
    }

    #[test]
    fn source_ref_generality() {
        assert!(SourceRef::default().is_general());
        assert!(!SourceRef::for_project(7).is_general());
    }

    #[test]
    fn scope_inclusion() {
        assert!(ProjectScope::All.includes(42));
        assert!(ProjectScope::Project(42).includes(42));
        assert!(!ProjectScope::Project(42).includes(7));
        assert_eq!(ProjectScope::Project(42).project_id(), Some(42));
        assert_eq!(ProjectScope::All.project_id(), None);
    }

    #[test]
    fn retry_bound_is_enforced_by_predicate() {
        let mut msg = NotificationMessage {
            id: 1,
            direction: Direction::Outbound,
            action_id: None,
            from_phone: None,
            to_phone: Some("+56912345678".into()),
            body: "hola".into(),
            message_type: MessageType::Text,
            status: DeliveryStatus::Failed,
            provider_message_id: None,
            retry_count: 0,
            error_message: Some("timeout".into()),
            created_at: Utc::now(),
            sent_at: None,
            delivered_at: None,
            read_at: None,
        };
        assert!(msg.is_retryable());

        msg.retry_count = MAX_RETRIES;
        assert!(!msg.is_retryable());

        msg.retry_count = 0;
        msg.direction = Direction::Inbound;
        assert!(!msg.is_retryable());
    }
}
