// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Communication collector: summarizes the report approval backlog.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tracing::debug;

use ofitec_core::traits::ReportStore;
use ofitec_core::types::{
    ActionCategory, ActionDraft, ActionType, Priority, ProjectScope, SourceRef,
};
use ofitec_core::OfitecError;

use crate::SignalCollector;

/// Approval backlogs are expected to clear within a day.
const DEADLINE_DAYS: i64 = 1;

/// Drafts a single portfolio-wide action when reports await approval.
///
/// The backlog count is global, so the draft carries no project reference
/// ("general" action). Confidence is fixed at 80.
pub struct CommunicationCollector {
    reports: Arc<dyn ReportStore>,
}

impl CommunicationCollector {
    pub fn new(reports: Arc<dyn ReportStore>) -> Self {
        Self { reports }
    }
}

#[async_trait]
impl SignalCollector for CommunicationCollector {
    fn name(&self) -> &'static str {
        "communication"
    }

    async fn collect(
        &self,
        _scope: ProjectScope,
        today: NaiveDate,
    ) -> Result<Vec<ActionDraft>, OfitecError> {
        let pending = self.reports.count_submitted().await?;
        debug!(pending, "reports awaiting approval");

        if pending == 0 {
            return Ok(Vec::new());
        }

        Ok(vec![ActionDraft {
            title: format!("Aprobar {pending} reportes pendientes"),
            description: format!(
                "Hay {pending} reportes diarios pendientes de aprobación. Es importante \
                 mantener el flujo de comunicación actualizado.",
            ),
            action_type: ActionType::Planned,
            priority: Priority::Medium,
            category: ActionCategory::Communication,
            source: SourceRef::default(),
            confidence_score: 80.0,
            impact_score: 5.0,
            urgency_score: 6.0,
            recommended_actions: "Revisar y aprobar reportes pendientes en el sistema".to_string(),
            expected_benefits: "Mejora en la comunicación y seguimiento del proyecto".to_string(),
            required_resources: "Supervisor o gerente de proyecto".to_string(),
            suggested_date: today,
            deadline: Some(today + Duration::days(DEADLINE_DAYS)),
            engine: "Communication Analysis Engine v1.0".to_string(),
            assignee: None,
        }])
    }
}
