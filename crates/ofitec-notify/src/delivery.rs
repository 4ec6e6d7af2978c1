// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Provider delivery-status callbacks applied to the message trail.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use ofitec_core::OfitecError;
use ofitec_core::types::{DeliveryStatus, ProviderMessageId};
use ofitec_storage::{Database, queries::messages};

/// Apply one provider status callback.
///
/// Unknown status strings and unknown provider ids are logged and
/// ignored; the provider replays callbacks, so this path must never
/// fail a webhook.
pub async fn record_status_callback(
    db: &Database,
    provider_id: &ProviderMessageId,
    status: &str,
    now: DateTime<Utc>,
) -> Result<(), OfitecError> {
    let Ok(status) = DeliveryStatus::from_str(status) else {
        warn!(provider_id = %provider_id.0, status, "unknown delivery status ignored");
        return Ok(());
    };

    if messages::apply_status(db, provider_id, status, now).await? {
        debug!(provider_id = %provider_id.0, ?status, "delivery status applied");
    } else {
        debug!(provider_id = %provider_id.0, ?status, "status for unknown message ignored");
    }
    Ok(())
}
