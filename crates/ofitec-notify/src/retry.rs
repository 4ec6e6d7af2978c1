// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Resend pass over failed outbound messages.
//!
//! Each failed message gets at most
//! [`MAX_RETRIES`](ofitec_core::types::MAX_RETRIES) re-sends on top of
//! its initial attempt; the counter lives on the message row, so the
//! pass is safe to run from a schedule as often as wanted.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use ofitec_core::OfitecError;
use ofitec_core::traits::MessageChannel;
use ofitec_storage::{
    Database,
    queries::{channel_state, messages},
};

/// Result of one retry pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryOutcome {
    pub attempted: usize,
    pub delivered: usize,
}

/// Re-send up to `limit` retryable failed messages through `channel`.
pub async fn retry_failed(
    db: &Database,
    channel: &Arc<dyn MessageChannel>,
    limit: usize,
    now: DateTime<Utc>,
) -> Result<RetryOutcome, OfitecError> {
    let batch = messages::retryable_failed(db, limit).await?;
    let mut outcome = RetryOutcome::default();

    for message in batch {
        let Some(to_phone) = message.to_phone.as_deref() else {
            warn!(message_id = message.id, "failed message has no phone, skipping");
            continue;
        };

        // A suppressed attempt keeps its retry slot for a later pass.
        if !channel_state::try_acquire(db, channel.name(), now).await? {
            warn!(message_id = message.id, "retry suppressed by rate limit");
            continue;
        }

        outcome.attempted += 1;
        messages::bump_retry(db, message.id).await?;
        match channel.send(to_phone, &message.body, message.message_type).await {
            Ok(provider_id) => {
                messages::mark_sent(db, message.id, &provider_id, now).await?;
                outcome.delivered += 1;
            }
            Err(error) => {
                warn!(message_id = message.id, %error, "retry failed");
                messages::mark_send_failed(db, message.id, &error.to_string()).await?;
            }
        }
    }

    if outcome.attempted > 0 {
        info!(
            attempted = outcome.attempted,
            delivered = outcome.delivered,
            "retry pass finished"
        );
    }
    Ok(outcome)
}
