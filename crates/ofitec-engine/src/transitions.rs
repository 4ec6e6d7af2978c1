// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Action lifecycle transitions.
//!
//! Transitions are forward-only and idempotent: re-applying the current
//! status succeeds without a write, while an invalid move or an unknown
//! action id reports `false` instead of erroring. Inbound commands are
//! retried by providers, so a duplicate "completado" must not fail.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use ofitec_core::OfitecError;
use ofitec_core::types::ActionStatus;
use ofitec_storage::{Database, queries::actions};

/// Move an action to `target` if the lifecycle allows it.
///
/// Returns whether the action is now in `target` state.
pub async fn transition(
    db: &Database,
    id: i64,
    target: ActionStatus,
    now: DateTime<Utc>,
) -> Result<bool, OfitecError> {
    let Some(action) = actions::get(db, id).await? else {
        warn!(action_id = id, ?target, "transition requested for unknown action");
        return Ok(false);
    };

    if action.status == target {
        debug!(action_id = id, ?target, "transition is a no-op");
        return Ok(true);
    }

    if !action.status.can_transition_to(target) {
        warn!(
            action_id = id,
            from = ?action.status,
            to = ?target,
            "transition rejected"
        );
        return Ok(false);
    }

    let completed_date = (target == ActionStatus::Completed).then_some(now);
    actions::update_status(db, id, target, completed_date).await?;
    debug!(action_id = id, from = ?action.status, to = ?target, "transition applied");
    Ok(true)
}

/// Acknowledge an action: pending to in-progress.
pub async fn start_progress(db: &Database, id: i64, now: DateTime<Utc>) -> Result<bool, OfitecError> {
    transition(db, id, ActionStatus::InProgress, now).await
}

/// Finish an action, stamping the completion time.
pub async fn mark_completed(db: &Database, id: i64, now: DateTime<Utc>) -> Result<bool, OfitecError> {
    transition(db, id, ActionStatus::Completed, now).await
}

/// Cancel an action from any non-terminal state.
pub async fn cancel(db: &Database, id: i64, now: DateTime<Utc>) -> Result<bool, OfitecError> {
    transition(db, id, ActionStatus::Cancelled, now).await
}
