// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Incident collector: drafts actions for unresolved site incidents.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use tracing::debug;

use ofitec_core::traits::IncidentStore;
use ofitec_core::types::{
    ActionCategory, ActionDraft, ActionType, Priority, ProjectScope, Severity, SourceRef,
};
use ofitec_core::OfitecError;

use crate::SignalCollector;

/// Incidents get three days when they carry no deadline of their own.
const DEFAULT_DEADLINE_DAYS: i64 = 3;

/// Spanish label for an incident severity, mirroring the site-report form.
fn severity_label_es(severity: Severity) -> &'static str {
    match severity {
        Severity::Low => "Baja",
        Severity::Medium => "Media",
        Severity::High => "Alta",
        Severity::Critical => "Crítica",
    }
}

/// Drafts one action per unresolved incident.
///
/// High/critical severity maps to (priority 2, urgent); everything else to
/// (priority 3, planned). Confidence is fixed at 85.
pub struct IncidentCollector {
    incidents: Arc<dyn IncidentStore>,
}

impl IncidentCollector {
    pub fn new(incidents: Arc<dyn IncidentStore>) -> Self {
        Self { incidents }
    }
}

#[async_trait]
impl SignalCollector for IncidentCollector {
    fn name(&self) -> &'static str {
        "incident"
    }

    async fn collect(
        &self,
        scope: ProjectScope,
        today: NaiveDate,
    ) -> Result<Vec<ActionDraft>, OfitecError> {
        let incidents = self.incidents.unresolved_incidents(scope).await?;
        debug!(count = incidents.len(), "unresolved incidents found");

        let drafts = incidents
            .into_iter()
            .map(|incident| {
                let severe = incident.severity.is_severe();
                ActionDraft {
                    title: format!("Resolver incidente activo: {}", incident.name),
                    description: format!(
                        "Incidente reportado: {}. Tipo: {}. Severidad: {}.",
                        incident.description,
                        incident.incident_type.label_es(),
                        severity_label_es(incident.severity),
                    ),
                    action_type: if severe {
                        ActionType::Urgent
                    } else {
                        ActionType::Planned
                    },
                    priority: if severe {
                        Priority::High
                    } else {
                        Priority::Medium
                    },
                    category: ActionCategory::Operational,
                    source: SourceRef {
                        project_id: Some(incident.project_id),
                        incident_id: Some(incident.id),
                        ..SourceRef::default()
                    },
                    confidence_score: 85.0,
                    impact_score: if incident.severity == Severity::Low {
                        6.0
                    } else {
                        8.0
                    },
                    urgency_score: if severe { 8.0 } else { 5.0 },
                    recommended_actions: incident.preventive_action.unwrap_or_else(|| {
                        "Investigar causa raíz y implementar solución".to_string()
                    }),
                    expected_benefits: "Resolución del incidente y prevención de recurrencia"
                        .to_string(),
                    required_resources: format!(
                        "Responsable: {}",
                        incident.responsible.as_deref().unwrap_or("Por asignar")
                    ),
                    suggested_date: today,
                    deadline: Some(
                        incident
                            .deadline
                            .unwrap_or(today + Duration::days(DEFAULT_DEADLINE_DAYS)),
                    ),
                    engine: "Incident Analysis Engine v1.0".to_string(),
                    assignee: None,
                }
            })
            .collect();

        Ok(drafts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ofitec_core::traits::IncidentState;
    use ofitec_test_utils::{MockIncidentStore, incident};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    #[tokio::test]
    async fn severe_incident_drafts_priority_two_urgent() {
        let store = Arc::new(MockIncidentStore::new());
        store.push(incident(1, 10, Severity::High, IncidentState::Open));

        let drafts = IncidentCollector::new(store)
            .collect(ProjectScope::All, today())
            .await
            .unwrap();

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].priority, Priority::High);
        assert_eq!(drafts[0].action_type, ActionType::Urgent);
        assert_eq!(drafts[0].urgency_score, 8.0);
        assert_eq!(drafts[0].impact_score, 8.0);
        assert_eq!(drafts[0].confidence_score, 85.0);
        assert_eq!(drafts[0].category, ActionCategory::Operational);
    }

    #[tokio::test]
    async fn mild_incident_drafts_priority_three_planned() {
        let store = Arc::new(MockIncidentStore::new());
        store.push(incident(1, 10, Severity::Low, IncidentState::InProgress));

        let drafts = IncidentCollector::new(store)
            .collect(ProjectScope::All, today())
            .await
            .unwrap();

        assert_eq!(drafts[0].priority, Priority::Medium);
        assert_eq!(drafts[0].action_type, ActionType::Planned);
        assert_eq!(drafts[0].urgency_score, 5.0);
        // Only low severity softens the impact score.
        assert_eq!(drafts[0].impact_score, 6.0);
    }

    #[tokio::test]
    async fn medium_severity_keeps_full_impact() {
        let store = Arc::new(MockIncidentStore::new());
        store.push(incident(1, 10, Severity::Medium, IncidentState::Open));

        let drafts = IncidentCollector::new(store)
            .collect(ProjectScope::All, today())
            .await
            .unwrap();
        assert_eq!(drafts[0].impact_score, 8.0);
        assert_eq!(drafts[0].urgency_score, 5.0);
    }

    #[tokio::test]
    async fn resolved_incidents_are_ignored() {
        let store = Arc::new(MockIncidentStore::new());
        store.push(incident(1, 10, Severity::Critical, IncidentState::Resolved));
        store.push(incident(2, 10, Severity::Critical, IncidentState::Closed));

        let drafts = IncidentCollector::new(store)
            .collect(ProjectScope::All, today())
            .await
            .unwrap();
        assert!(drafts.is_empty());
    }

    #[tokio::test]
    async fn deadline_defaults_to_three_days_out() {
        let store = Arc::new(MockIncidentStore::new());
        store.push(incident(1, 10, Severity::High, IncidentState::Open));

        let drafts = IncidentCollector::new(store)
            .collect(ProjectScope::All, today())
            .await
            .unwrap();
        assert_eq!(drafts[0].deadline, Some(today() + Duration::days(3)));
    }
}
