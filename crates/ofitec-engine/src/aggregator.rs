// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Action aggregation: run the collectors, deduplicate, persist.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{info, warn};

use ofitec_collectors::SignalCollector;
use ofitec_core::OfitecError;
use ofitec_core::types::ProjectScope;
use ofitec_storage::{Database, queries::actions};

/// Aggregator knobs, lifted from the engine config section.
#[derive(Debug, Clone, Copy)]
pub struct EngineSettings {
    /// Skip a draft when a pending action already covers the same
    /// category and source references.
    pub dedupe_pending: bool,
    /// Terminal actions older than this many days are purged.
    pub retention_days: u32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            dedupe_pending: true,
            retention_days: 30,
        }
    }
}

/// Outcome of one generation pass.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    /// Ids of the actions persisted this pass, in insertion order.
    pub created: Vec<i64>,
    /// Drafts skipped by pending-action deduplication.
    pub skipped: usize,
}

/// Outcome of a full analysis cycle (purge plus generation).
#[derive(Debug, Clone, Default)]
pub struct AnalysisReport {
    pub purged: usize,
    pub generation: GenerationReport,
}

/// Runs the signal collectors and turns their drafts into stored actions.
pub struct ActionEngine {
    db: Database,
    collectors: Vec<Arc<dyn SignalCollector>>,
    settings: EngineSettings,
}

impl ActionEngine {
    pub fn new(
        db: Database,
        collectors: Vec<Arc<dyn SignalCollector>>,
        settings: EngineSettings,
    ) -> Self {
        Self {
            db,
            collectors,
            settings,
        }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Run every collector over `scope` and persist the surviving drafts.
    ///
    /// A collector failure is logged and skipped; one broken domain must
    /// not stop recommendations from the others.
    pub async fn generate_actions(
        &self,
        scope: ProjectScope,
        now: DateTime<Utc>,
    ) -> Result<GenerationReport, OfitecError> {
        let today = now.date_naive();
        let mut report = GenerationReport::default();

        for collector in &self.collectors {
            let drafts = match collector.collect(scope, today).await {
                Ok(drafts) => drafts,
                Err(error) => {
                    warn!(collector = collector.name(), %error, "collector failed, skipping");
                    continue;
                }
            };

            for draft in drafts {
                if self.settings.dedupe_pending
                    && actions::exists_pending_for_source(&self.db, draft.category, draft.source)
                        .await?
                {
                    report.skipped += 1;
                    continue;
                }
                let id = actions::insert(&self.db, &draft, now).await?;
                report.created.push(id);
            }
        }

        info!(
            created = report.created.len(),
            skipped = report.skipped,
            "action generation finished"
        );
        Ok(report)
    }

    /// Delete completed and cancelled actions past the retention window.
    pub async fn purge_stale(&self, now: DateTime<Utc>) -> Result<usize, OfitecError> {
        let cutoff = now - Duration::days(i64::from(self.settings.retention_days));
        let purged = actions::purge_stale(&self.db, cutoff).await?;
        if purged > 0 {
            info!(purged, "stale actions purged");
        }
        Ok(purged)
    }

    /// One full cycle: purge old terminal actions, then generate new ones.
    pub async fn run_analysis(
        &self,
        scope: ProjectScope,
        now: DateTime<Utc>,
    ) -> Result<AnalysisReport, OfitecError> {
        let purged = self.purge_stale(now).await?;
        let generation = self.generate_actions(scope, now).await?;
        Ok(AnalysisReport { purged, generation })
    }
}
