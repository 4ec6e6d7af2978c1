// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Risk collector: drafts actions for open high/critical risks.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tracing::debug;

use ofitec_core::traits::RiskStore;
use ofitec_core::types::{
    ActionCategory, ActionDraft, ActionType, Priority, ProjectScope, Severity, SourceRef,
};
use ofitec_core::OfitecError;

use crate::SignalCollector;

/// Default mitigation deadline when the risk itself has none.
const DEFAULT_DEADLINE_DAYS: i64 = 7;

/// Drafts one action per open severe risk.
///
/// Severity maps to (priority, action type): critical -> (1, immediate),
/// high -> (2, urgent). Confidence is fixed at 95.
pub struct RiskCollector {
    risks: Arc<dyn RiskStore>,
}

impl RiskCollector {
    pub fn new(risks: Arc<dyn RiskStore>) -> Self {
        Self { risks }
    }
}

#[async_trait]
impl SignalCollector for RiskCollector {
    fn name(&self) -> &'static str {
        "risk"
    }

    async fn collect(
        &self,
        scope: ProjectScope,
        today: NaiveDate,
    ) -> Result<Vec<ActionDraft>, OfitecError> {
        let risks = self.risks.severe_open_risks(scope).await?;
        debug!(count = risks.len(), "severe open risks found");

        let drafts = risks
            .into_iter()
            .map(|risk| {
                let critical = risk.severity == Severity::Critical;
                let (priority, action_type) = if critical {
                    (Priority::Critical, ActionType::Immediate)
                } else {
                    (Priority::High, ActionType::Urgent)
                };

                ActionDraft {
                    title: format!("Acción inmediata para riesgo crítico: {}", risk.name),
                    description: format!(
                        "Se requiere atención inmediata para el riesgo: {}. Causa: {}. \
                         Impacto potencial: {}.",
                        risk.description,
                        risk.causes.as_deref().unwrap_or("Por determinar"),
                        risk.consequences.as_deref().unwrap_or("Significativo"),
                    ),
                    action_type,
                    priority,
                    category: ActionCategory::Risk,
                    source: SourceRef {
                        project_id: Some(risk.project_id),
                        risk_id: Some(risk.id),
                        ..SourceRef::default()
                    },
                    confidence_score: 95.0,
                    impact_score: if critical { 9.0 } else { 7.0 },
                    urgency_score: if critical { 10.0 } else { 8.0 },
                    recommended_actions: risk
                        .mitigation_plan
                        .unwrap_or_else(|| {
                            "Revisar y ejecutar plan de mitigación definido".to_string()
                        }),
                    expected_benefits:
                        "Reducción significativa del riesgo y prevención de impactos mayores"
                            .to_string(),
                    required_resources:
                        "Equipo responsable, recursos definidos en plan de mitigación".to_string(),
                    suggested_date: today,
                    deadline: Some(
                        risk.deadline
                            .unwrap_or(today + Duration::days(DEFAULT_DEADLINE_DAYS)),
                    ),
                    engine: "Risk Analysis Engine v2.0".to_string(),
                    assignee: None,
                }
            })
            .collect();

        Ok(drafts)
    }
}
