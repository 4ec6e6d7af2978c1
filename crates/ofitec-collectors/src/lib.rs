// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Signal collectors for the OFITEC next-action engine.
//!
//! Each collector scans one domain (risks, budgets, incidents, reporting
//! cadence, approval backlog) and drafts prioritized recommendations. The
//! scores, thresholds, and deadline offsets in these modules are exact
//! contracts shared with the original analysis engines, not tunables.
//!
//! Collectors are side-effect-free: they read through the store traits and
//! return [`ActionDraft`]s. Persistence and deduplication belong to the
//! aggregator in `ofitec-engine`.

pub mod communication;
pub mod financial;
pub mod incident;
pub mod progress;
pub mod risk;

use async_trait::async_trait;
use chrono::NaiveDate;

use ofitec_core::types::{ActionDraft, ProjectScope};
use ofitec_core::OfitecError;

pub use communication::CommunicationCollector;
pub use financial::FinancialCollector;
pub use incident::IncidentCollector;
pub use progress::ProgressCollector;
pub use risk::RiskCollector;

/// A pure analysis pass over one domain.
///
/// `today` is injected so draft dates are deterministic under test.
#[async_trait]
pub trait SignalCollector: Send + Sync {
    /// Collector name used in logs.
    fn name(&self) -> &'static str;

    /// Scan the domain and draft candidate actions for the given scope.
    async fn collect(
        &self,
        scope: ProjectScope,
        today: NaiveDate,
    ) -> Result<Vec<ActionDraft>, OfitecError>;
}

/// Format a monetary amount with thousands separators, no decimals.
///
/// `1234567.8` renders as `"1,234,568"`, matching the notification copy.
pub(crate) fn format_amount(amount: f64) -> String {
    let rounded = amount.round() as i64;
    let digits = rounded.abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0 {
        out.push('-');
    }
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (i + 3 - offset) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
