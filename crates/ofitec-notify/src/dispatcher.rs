// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notification fan-out for stored actions.
//!
//! One dispatch resolves the recipient set, renders the Spanish
//! notification once, and sends it to each phone sequentially. Delivery
//! failures are recorded but never propagate; the action is flagged
//! `notified` as soon as one recipient got the message.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use ofitec_core::OfitecError;
use ofitec_core::traits::{MessageChannel, ProjectStore};
use ofitec_core::types::{Action, MessageType, Recipient};
use ofitec_storage::{
    Database,
    queries::{actions, channel_state, messages},
};

use crate::{phone, render};

/// Result of one action dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    /// Recipients with a usable phone that we attempted to reach.
    pub attempted: usize,
    /// Sends accepted by the provider.
    pub delivered: usize,
    /// Sends rejected by the provider or the rate limiter.
    pub failed: usize,
}

/// Sends action notifications through one channel.
pub struct Dispatcher {
    db: Database,
    channel: Arc<dyn MessageChannel>,
    projects: Arc<dyn ProjectStore>,
}

impl Dispatcher {
    pub fn new(
        db: Database,
        channel: Arc<dyn MessageChannel>,
        projects: Arc<dyn ProjectStore>,
    ) -> Self {
        Self {
            db,
            channel,
            projects,
        }
    }

    /// Register the channel's rate-limiter row with the configured limit.
    pub async fn register_channel(&self, rate_limit: u32) -> Result<(), OfitecError> {
        channel_state::ensure(&self.db, self.channel.name(), i64::from(rate_limit)).await
    }

    /// Notify every eligible recipient of one action.
    ///
    /// Skips silently when the action is not notification-eligible or
    /// already left the pending state.
    pub async fn notify_action(
        &self,
        action_id: i64,
        now: DateTime<Utc>,
    ) -> Result<DispatchOutcome, OfitecError> {
        let action = actions::get(&self.db, action_id)
            .await?
            .ok_or(OfitecError::NotFound {
                entity: "action",
                id: action_id,
            })?;

        if !action.is_notifiable() || action.status.is_terminal() {
            debug!(action_id, "action not eligible for notification");
            return Ok(DispatchOutcome::default());
        }

        let recipients = self.resolve_recipients(&action).await?;
        if recipients.is_empty() {
            warn!(action_id, "no recipients with a phone, nothing to send");
            return Ok(DispatchOutcome::default());
        }

        let project_name = match action.source.project_id {
            Some(project_id) => self
                .projects
                .find_project(project_id)
                .await?
                .map(|p| p.name),
            None => None,
        };
        let body = render::action_notification(&action, project_name.as_deref());

        let mut outcome = DispatchOutcome::default();
        for (to_phone, recipient) in recipients {
            outcome.attempted += 1;
            let message_id = messages::insert_outbound(
                &self.db,
                Some(action.id),
                &to_phone,
                &body,
                MessageType::Text,
                now,
            )
            .await?;

            if !channel_state::try_acquire(&self.db, self.channel.name(), now).await? {
                warn!(action_id, %to_phone, "send suppressed by rate limit");
                messages::mark_send_failed(&self.db, message_id, "rate limit exceeded").await?;
                outcome.failed += 1;
                continue;
            }

            match self.channel.send(&to_phone, &body, MessageType::Text).await {
                Ok(provider_id) => {
                    messages::mark_sent(&self.db, message_id, &provider_id, now).await?;
                    outcome.delivered += 1;
                    debug!(action_id, recipient = %recipient.name, "notification sent");
                }
                Err(error) => {
                    warn!(action_id, %to_phone, %error, "notification send failed");
                    messages::mark_send_failed(&self.db, message_id, &error.to_string()).await?;
                    outcome.failed += 1;
                }
            }
        }

        if outcome.delivered > 0 {
            actions::mark_notified(&self.db, action.id).await?;
        }

        info!(
            action_id,
            attempted = outcome.attempted,
            delivered = outcome.delivered,
            failed = outcome.failed,
            "dispatch finished"
        );
        Ok(outcome)
    }

    /// Sweep pending critical/high actions that were never notified.
    ///
    /// Per-action failures are logged and skipped so one bad record
    /// cannot stall the batch.
    pub async fn notify_pending(
        &self,
        batch: usize,
        now: DateTime<Utc>,
    ) -> Result<Vec<(i64, DispatchOutcome)>, OfitecError> {
        let pending = actions::pending_unnotified(&self.db, batch).await?;
        let mut results = Vec::with_capacity(pending.len());
        for action in pending {
            match self.notify_action(action.id, now).await {
                Ok(outcome) => results.push((action.id, outcome)),
                Err(error) => {
                    warn!(action_id = action.id, %error, "reminder dispatch failed");
                }
            }
        }
        Ok(results)
    }

    /// Explicit recipients plus the assignee and the project owner,
    /// deduplicated by normalized phone. Recipients without a phone are
    /// dropped.
    async fn resolve_recipients(
        &self,
        action: &Action,
    ) -> Result<Vec<(String, Recipient)>, OfitecError> {
        let mut candidates: Vec<Recipient> = action.recipients.clone();
        if let Some(assignee) = &action.assignee {
            candidates.push(assignee.clone());
        }
        if let Some(project_id) = action.source.project_id {
            if let Some(owner) = self
                .projects
                .find_project(project_id)
                .await?
                .and_then(|p| p.owner)
            {
                candidates.push(owner);
            }
        }

        let mut seen = HashSet::new();
        let mut resolved = Vec::new();
        for recipient in candidates {
            let Some(normalized) = recipient.phone.as_deref().and_then(phone::normalize) else {
                continue;
            };
            if seen.insert(normalized.clone()) {
                resolved.push((normalized, recipient));
            }
        }
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use ofitec_core::types::{
        ActionCategory, ActionDraft, ActionStatus, ActionType, DeliveryStatus, Priority, SourceRef,
    };
    use ofitec_test_utils::{MockChannel, MockProjectStore, project};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    fn draft(priority: Priority, project_id: Option<i64>) -> ActionDraft {
        ActionDraft {
            title: "Revisar presupuesto".into(),
            description: "Desviación sobre el umbral".into(),
            action_type: ActionType::Urgent,
            priority,
            category: ActionCategory::Financial,
            source: SourceRef {
                project_id,
                ..SourceRef::default()
            },
            confidence_score: 90.0,
            impact_score: 8.0,
            urgency_score: 9.0,
            recommended_actions: String::new(),
            expected_benefits: String::new(),
            required_resources: String::new(),
            suggested_date: now().date_naive(),
            deadline: None,
            engine: "Financial Analysis Engine v1.5".into(),
            assignee: None,
        }
    }

    struct Fixture {
        db: Database,
        channel: Arc<MockChannel>,
        dispatcher: Dispatcher,
    }

    async fn fixture() -> Fixture {
        let db = Database::in_memory().await.unwrap();
        let channel = Arc::new(MockChannel::new());
        let projects = Arc::new(MockProjectStore::new());
        projects.push(project(10, "Torre Norte", "+56911111111"));
        let dispatcher = Dispatcher::new(db.clone(), channel.clone(), projects);
        dispatcher.register_channel(100).await.unwrap();
        Fixture {
            db,
            channel,
            dispatcher,
        }
    }

    #[tokio::test]
    async fn owner_receives_notification_and_action_is_flagged() {
        let f = fixture().await;
        let id = actions::insert(&f.db, &draft(Priority::Critical, Some(10)), now())
            .await
            .unwrap();

        let outcome = f.dispatcher.notify_action(id, now()).await.unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome {
                attempted: 1,
                delivered: 1,
                failed: 0
            }
        );

        let sent = f.channel.sent_messages().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to_phone, "+56911111111");
        assert!(sent[0].body.contains("Torre Norte"));
        assert!(sent[0].body.contains("Revisar presupuesto"));

        let action = actions::get(&f.db, id).await.unwrap().unwrap();
        assert!(action.notified);
    }

    #[tokio::test]
    async fn assignee_is_notified_alongside_the_owner() {
        let f = fixture().await;
        let mut d = draft(Priority::Critical, Some(10));
        d.assignee = Some(Recipient::new("Jefe de Terreno", "+56933333333"));
        let id = actions::insert(&f.db, &d, now()).await.unwrap();

        let outcome = f.dispatcher.notify_action(id, now()).await.unwrap();
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.delivered, 2);

        let phones: Vec<String> = f
            .channel
            .sent_messages()
            .await
            .into_iter()
            .map(|m| m.to_phone)
            .collect();
        assert_eq!(phones, vec!["+56933333333", "+56911111111"]);
    }

    #[tokio::test]
    async fn assignee_sharing_the_owner_phone_is_deduplicated() {
        let f = fixture().await;
        let mut d = draft(Priority::High, Some(10));
        // Same phone as the owner, unprefixed.
        d.assignee = Some(Recipient::new("Jefa de Obra", "56911111111"));
        let id = actions::insert(&f.db, &d, now()).await.unwrap();

        let outcome = f.dispatcher.notify_action(id, now()).await.unwrap();
        assert_eq!(outcome.attempted, 1);
        assert_eq!(outcome.delivered, 1);
    }

    #[tokio::test]
    async fn recipients_are_deduplicated_by_phone() {
        let f = fixture().await;
        let id = actions::insert(&f.db, &draft(Priority::High, Some(10)), now())
            .await
            .unwrap();
        // Explicit recipient shares the owner's phone, unprefixed.
        actions::set_recipients(
            &f.db,
            id,
            &[
                Recipient::new("Jefa de Obra", "56911111111"),
                Recipient::new("Supervisor", "+56922222222"),
            ],
        )
        .await
        .unwrap();

        let outcome = f.dispatcher.notify_action(id, now()).await.unwrap();
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.delivered, 2);

        let phones: Vec<String> = f
            .channel
            .sent_messages()
            .await
            .into_iter()
            .map(|m| m.to_phone)
            .collect();
        assert_eq!(phones, vec!["+56911111111", "+56922222222"]);
    }

    #[tokio::test]
    async fn partial_failure_still_marks_notified() {
        let f = fixture().await;
        f.channel.fail_phone("+56911111111").await;

        let id = actions::insert(&f.db, &draft(Priority::Critical, Some(10)), now())
            .await
            .unwrap();
        actions::set_recipients(&f.db, id, &[Recipient::new("Supervisor", "+56922222222")])
            .await
            .unwrap();

        let outcome = f.dispatcher.notify_action(id, now()).await.unwrap();
        assert_eq!(outcome.delivered, 1);
        assert_eq!(outcome.failed, 1);

        let action = actions::get(&f.db, id).await.unwrap().unwrap();
        assert!(action.notified);
    }

    #[tokio::test]
    async fn total_failure_leaves_action_unnotified() {
        let f = fixture().await;
        f.channel.fail_all(true);

        let id = actions::insert(&f.db, &draft(Priority::Critical, Some(10)), now())
            .await
            .unwrap();
        let outcome = f.dispatcher.notify_action(id, now()).await.unwrap();
        assert_eq!(outcome.delivered, 0);
        assert_eq!(outcome.failed, 1);

        let action = actions::get(&f.db, id).await.unwrap().unwrap();
        assert!(!action.notified);

        // The audit row keeps the failure for retry.
        let failed = messages::retryable_failed(&f.db, 10).await.unwrap();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].status, DeliveryStatus::Failed);
    }

    #[tokio::test]
    async fn low_priority_actions_are_skipped() {
        let f = fixture().await;
        let id = actions::insert(&f.db, &draft(Priority::Medium, Some(10)), now())
            .await
            .unwrap();

        let outcome = f.dispatcher.notify_action(id, now()).await.unwrap();
        assert_eq!(outcome, DispatchOutcome::default());
        assert_eq!(f.channel.sent_count().await, 0);
    }

    #[tokio::test]
    async fn unknown_action_is_an_error() {
        let f = fixture().await;
        let err = f.dispatcher.notify_action(999, now()).await.unwrap_err();
        assert!(matches!(err, OfitecError::NotFound { .. }));
    }

    #[tokio::test]
    async fn rate_limit_suppresses_excess_sends() {
        let f = fixture().await;
        f.dispatcher.register_channel(1).await.unwrap();

        let id = actions::insert(&f.db, &draft(Priority::Critical, Some(10)), now())
            .await
            .unwrap();
        actions::set_recipients(&f.db, id, &[Recipient::new("Supervisor", "+56922222222")])
            .await
            .unwrap();

        let outcome = f.dispatcher.notify_action(id, now()).await.unwrap();
        assert_eq!(outcome.attempted, 2);
        assert_eq!(outcome.delivered, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(f.channel.sent_count().await, 1);
    }

    #[tokio::test]
    async fn pending_sweep_notifies_each_eligible_action() {
        let f = fixture().await;
        let a = actions::insert(&f.db, &draft(Priority::Critical, Some(10)), now())
            .await
            .unwrap();
        let b = actions::insert(&f.db, &draft(Priority::High, Some(10)), now())
            .await
            .unwrap();
        // Already in progress; the sweep only covers pending actions.
        let c = actions::insert(&f.db, &draft(Priority::High, Some(10)), now())
            .await
            .unwrap();
        actions::update_status(&f.db, c, ActionStatus::InProgress, None)
            .await
            .unwrap();

        let results = f.dispatcher.notify_pending(200, now()).await.unwrap();
        let ids: Vec<i64> = results.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![a, b]);
        assert_eq!(f.channel.sent_count().await, 2);

        // A second sweep finds nothing; everything is flagged notified.
        let again = f.dispatcher.notify_pending(200, now()).await.unwrap();
        assert!(again.is_empty());
    }
}
