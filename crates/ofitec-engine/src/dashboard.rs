// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Dashboard summary assembled from the stored actions and message trail.

use chrono::{DateTime, Utc};

use ofitec_core::OfitecError;
use ofitec_core::types::Action;
use ofitec_storage::{
    Database,
    queries::{
        actions::{self, ActionCounts},
        messages::{self, DailyTraffic},
    },
};

/// How many urgent actions the summary lists.
const URGENT_LIMIT: usize = 5;

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub counts: ActionCounts,
    /// Top pending critical/high actions, by priority then suggested date.
    pub urgent: Vec<Action>,
    /// Messages sent and received today.
    pub traffic: DailyTraffic,
}

/// Assemble the status summary for the given instant.
pub async fn summary(db: &Database, now: DateTime<Utc>) -> Result<DashboardSummary, OfitecError> {
    let today = now.date_naive();
    Ok(DashboardSummary {
        counts: actions::counts(db, today).await?,
        urgent: actions::urgent_pending(db, URGENT_LIMIT).await?,
        traffic: messages::traffic_for_day(db, today).await?,
    })
}
