// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Financial collector: drafts actions for budgets drifting past plan.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tracing::debug;

use ofitec_core::traits::{BudgetStore, ProjectStore};
use ofitec_core::types::{
    ActionCategory, ActionDraft, ActionType, Priority, ProjectScope, SourceRef,
};
use ofitec_core::OfitecError;

use crate::{SignalCollector, format_amount};

/// Variance above this percentage draws attention at all.
const VARIANCE_THRESHOLD: f64 = 15.0;
/// Variance above this percentage escalates to critical/urgent.
const VARIANCE_CRITICAL: f64 = 25.0;
/// Budget reviews get five days.
const DEADLINE_DAYS: i64 = 5;

/// Drafts one action per active budget with variance above 15%.
///
/// Variance > 25% maps to (priority 1, urgent); 15% < variance <= 25%
/// maps to (priority 2, planned). Confidence is fixed at 90.
pub struct FinancialCollector {
    budgets: Arc<dyn BudgetStore>,
    projects: Arc<dyn ProjectStore>,
}

impl FinancialCollector {
    pub fn new(budgets: Arc<dyn BudgetStore>, projects: Arc<dyn ProjectStore>) -> Self {
        Self { budgets, projects }
    }
}

#[async_trait]
impl SignalCollector for FinancialCollector {
    fn name(&self) -> &'static str {
        "financial"
    }

    async fn collect(
        &self,
        scope: ProjectScope,
        today: NaiveDate,
    ) -> Result<Vec<ActionDraft>, OfitecError> {
        let budgets = self.budgets.active_budgets(scope).await?;
        debug!(count = budgets.len(), "active budgets scanned");

        let mut drafts = Vec::new();
        for budget in budgets {
            if budget.variance_percentage <= VARIANCE_THRESHOLD {
                continue;
            }

            let critical = budget.variance_percentage > VARIANCE_CRITICAL;
            let project_name = self
                .projects
                .find_project(budget.project_id)
                .await?
                .map(|p| p.name)
                .unwrap_or_else(|| format!("Proyecto {}", budget.project_id));

            drafts.push(ActionDraft {
                title: format!("Revisar varianza presupuestaria alta en {project_name}"),
                description: format!(
                    "El proyecto presenta una varianza presupuestaria de {:.1}%. \
                     Costo estimado total: ${}. Presupuesto original: ${}.",
                    budget.variance_percentage,
                    format_amount(budget.estimated_total_cost),
                    format_amount(budget.budget_amount),
                ),
                action_type: if critical {
                    ActionType::Urgent
                } else {
                    ActionType::Planned
                },
                priority: if critical {
                    Priority::Critical
                } else {
                    Priority::High
                },
                category: ActionCategory::Financial,
                source: SourceRef {
                    project_id: Some(budget.project_id),
                    budget_id: Some(budget.id),
                    ..SourceRef::default()
                },
                confidence_score: 90.0,
                impact_score: 8.0,
                urgency_score: if critical { 9.0 } else { 6.0 },
                recommended_actions: "Revisar causas de la varianza, ajustar presupuesto si es \
                                      necesario, implementar medidas de control de costos"
                    .to_string(),
                expected_benefits:
                    "Mejor control financiero y prevención de desviaciones mayores".to_string(),
                required_resources: "Equipo financiero, datos de costos actualizados".to_string(),
                suggested_date: today,
                deadline: Some(today + Duration::days(DEADLINE_DAYS)),
                engine: "Financial Analysis Engine v1.5".to_string(),
                assignee: None,
            });
        }

        Ok(drafts)
    }
}
