// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Progress collector: flags projects with stale daily reporting.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tracing::debug;

use ofitec_core::traits::{ProjectStore, ReportStore};
use ofitec_core::types::{
    ActionCategory, ActionDraft, ActionType, Priority, ProjectScope, SourceRef,
};
use ofitec_core::OfitecError;

use crate::SignalCollector;

/// A project counts as stale once its last approved report is older than this.
const STALE_AFTER_DAYS: i64 = 3;
/// Requested updates are expected within two days.
const DEADLINE_DAYS: i64 = 2;

/// Drafts a reporting reminder per project without a recent approved report.
///
/// Projects that never filed an approved report are treated as stale too.
/// Confidence is fixed at 75.
pub struct ProgressCollector {
    projects: Arc<dyn ProjectStore>,
    reports: Arc<dyn ReportStore>,
}

impl ProgressCollector {
    pub fn new(projects: Arc<dyn ProjectStore>, reports: Arc<dyn ReportStore>) -> Self {
        Self { projects, reports }
    }
}

#[async_trait]
impl SignalCollector for ProgressCollector {
    fn name(&self) -> &'static str {
        "progress"
    }

    async fn collect(
        &self,
        scope: ProjectScope,
        today: NaiveDate,
    ) -> Result<Vec<ActionDraft>, OfitecError> {
        let projects = self.projects.find_projects(scope).await?;
        debug!(count = projects.len(), "projects scanned for reporting cadence");

        let mut drafts = Vec::new();
        for project in projects {
            let last_report = self.reports.latest_approved_report(project.id).await?;

            let (stale, days_since, last_label) = match &last_report {
                Some(report) => {
                    let days = (today - report.date).num_days();
                    (days > STALE_AFTER_DAYS, days, report.date.format("%Y-%m-%d").to_string())
                }
                None => (true, 0, "Nunca".to_string()),
            };

            if !stale {
                continue;
            }

            drafts.push(ActionDraft {
                title: format!("Actualizar reporte de progreso en {}", project.name),
                description: format!(
                    "No se han recibido reportes de progreso en los últimos {days_since} días. \
                     Último reporte: {last_label}.",
                ),
                action_type: ActionType::Planned,
                priority: Priority::Medium,
                category: ActionCategory::Operational,
                source: SourceRef::for_project(project.id),
                confidence_score: 75.0,
                impact_score: 4.0,
                urgency_score: 6.0,
                recommended_actions: "Solicitar actualización de progreso del proyecto"
                    .to_string(),
                expected_benefits: "Mantener control y seguimiento actualizado del proyecto"
                    .to_string(),
                required_resources: "Equipo de obra responsable del proyecto".to_string(),
                suggested_date: today,
                deadline: Some(today + Duration::days(DEADLINE_DAYS)),
                engine: "Progress Monitoring Engine v1.2".to_string(),
                assignee: None,
            });
        }

        Ok(drafts)
    }
}
