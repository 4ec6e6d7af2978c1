// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Inbound reply processing.
//!
//! Every inbound message is recorded in the trail first, command or
//! not. Correlation is strict: a reply drives an action only when it
//! quotes the provider id of a notification we sent for that action.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use ofitec_core::OfitecError;
use ofitec_core::traits::MessageChannel;
use ofitec_core::types::{ActionStatus, MessageType, ProviderMessageId};
use ofitec_engine::transitions;
use ofitec_notify::render;
use ofitec_storage::{
    Database,
    queries::{channel_state, messages},
};

use crate::parser;

/// What happened to one inbound message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// A command was applied; the action now has this status.
    Applied { action_id: i64, status: ActionStatus },
    /// A command was recognized but the lifecycle rejected the move.
    Rejected { action_id: i64 },
    /// The reply did not quote any notification we sent.
    Uncorrelated,
    /// The body is free text, not a command.
    Unrecognized,
}

/// Applies reply commands to actions and sends Spanish confirmations.
pub struct CommandProcessor {
    db: Database,
    channel: Arc<dyn MessageChannel>,
}

impl CommandProcessor {
    pub fn new(db: Database, channel: Arc<dyn MessageChannel>) -> Self {
        Self { db, channel }
    }

    /// Handle one inbound message from the webhook.
    ///
    /// `context_id` is the provider id of the outbound message the user
    /// replied to, when the payload carries one.
    pub async fn handle_inbound(
        &self,
        from_phone: &str,
        body: &str,
        provider_id: &ProviderMessageId,
        context_id: Option<&ProviderMessageId>,
        now: DateTime<Utc>,
    ) -> Result<CommandOutcome, OfitecError> {
        let action_id = match context_id {
            Some(context_id) => messages::find_outbound_by_provider_id(&self.db, context_id)
                .await?
                .and_then(|m| m.action_id),
            None => None,
        };

        messages::record_inbound(
            &self.db,
            action_id,
            from_phone,
            body,
            MessageType::Text,
            provider_id,
            now,
        )
        .await?;

        let Some(command) = parser::parse(body) else {
            debug!(from_phone, "inbound message is not a command");
            return Ok(CommandOutcome::Unrecognized);
        };

        let Some(action_id) = action_id else {
            warn!(from_phone, ?command, "command without correlated action");
            return Ok(CommandOutcome::Uncorrelated);
        };

        let target = command.target_status();
        if !transitions::transition(&self.db, action_id, target, now).await? {
            warn!(action_id, ?target, "command rejected by lifecycle");
            return Ok(CommandOutcome::Rejected { action_id });
        }

        info!(action_id, from_phone, ?target, "command applied");
        self.send_confirmation(from_phone, target, now).await?;
        Ok(CommandOutcome::Applied {
            action_id,
            status: target,
        })
    }

    /// Send the confirmation reply. Failures are recorded and logged,
    /// never propagated; the state change already happened.
    async fn send_confirmation(
        &self,
        to_phone: &str,
        status: ActionStatus,
        now: DateTime<Utc>,
    ) -> Result<(), OfitecError> {
        let Some(body) = render::command_confirmation(status) else {
            return Ok(());
        };

        let message_id =
            messages::insert_outbound(&self.db, None, to_phone, body, MessageType::Text, now)
                .await?;

        if !channel_state::try_acquire(&self.db, self.channel.name(), now).await? {
            warn!(to_phone, "confirmation suppressed by rate limit");
            messages::mark_send_failed(&self.db, message_id, "rate limit exceeded").await?;
            return Ok(());
        }

        match self.channel.send(to_phone, body, MessageType::Text).await {
            Ok(provider_id) => {
                messages::mark_sent(&self.db, message_id, &provider_id, now).await?;
            }
            Err(error) => {
                warn!(to_phone, %error, "confirmation send failed");
                messages::mark_send_failed(&self.db, message_id, &error.to_string()).await?;
            }
        }
        Ok(())
    }
}
