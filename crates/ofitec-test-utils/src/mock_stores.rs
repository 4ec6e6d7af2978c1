// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory domain stores for collector and engine tests.
//!
//! Each mock holds plain `Vec`s of records and applies the same filters the
//! SQLite implementations do, so collector tests exercise the real
//! threshold logic without a database.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use ofitec_core::traits::{
    BudgetRecord, BudgetStore, IncidentRecord, IncidentState, IncidentStore, IncidentType,
    ProjectRecord, ProjectStore, ReportRecord, ReportState, ReportStore, RiskRecord, RiskStatus,
    RiskStore,
};
use ofitec_core::types::{ProjectScope, Recipient, Severity};
use ofitec_core::OfitecError;

/// In-memory [`ProjectStore`].
#[derive(Default)]
pub struct MockProjectStore {
    projects: Mutex<Vec<ProjectRecord>>,
}

impl MockProjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, project: ProjectRecord) {
        self.projects.lock().unwrap().push(project);
    }
}

#[async_trait]
impl ProjectStore for MockProjectStore {
    async fn find_projects(&self, scope: ProjectScope) -> Result<Vec<ProjectRecord>, OfitecError> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .filter(|p| scope.includes(p.id))
            .cloned()
            .collect())
    }

    async fn find_project(&self, id: i64) -> Result<Option<ProjectRecord>, OfitecError> {
        Ok(self
            .projects
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }
}

/// In-memory [`RiskStore`].
#[derive(Default)]
pub struct MockRiskStore {
    risks: Mutex<Vec<RiskRecord>>,
}

impl MockRiskStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, risk: RiskRecord) {
        self.risks.lock().unwrap().push(risk);
    }
}

#[async_trait]
impl RiskStore for MockRiskStore {
    async fn severe_open_risks(
        &self,
        scope: ProjectScope,
    ) -> Result<Vec<RiskRecord>, OfitecError> {
        Ok(self
            .risks
            .lock()
            .unwrap()
            .iter()
            .filter(|r| {
                scope.includes(r.project_id) && r.severity.is_severe() && r.status.is_actionable()
            })
            .cloned()
            .collect())
    }
}

/// In-memory [`BudgetStore`].
#[derive(Default)]
pub struct MockBudgetStore {
    budgets: Mutex<Vec<BudgetRecord>>,
}

impl MockBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, budget: BudgetRecord) {
        self.budgets.lock().unwrap().push(budget);
    }
}

#[async_trait]
impl BudgetStore for MockBudgetStore {
    async fn active_budgets(&self, scope: ProjectScope) -> Result<Vec<BudgetRecord>, OfitecError> {
        Ok(self
            .budgets
            .lock()
            .unwrap()
            .iter()
            .filter(|b| scope.includes(b.project_id))
            .cloned()
            .collect())
    }
}

/// In-memory [`IncidentStore`].
#[derive(Default)]
pub struct MockIncidentStore {
    incidents: Mutex<Vec<IncidentRecord>>,
}

impl MockIncidentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, incident: IncidentRecord) {
        self.incidents.lock().unwrap().push(incident);
    }
}

#[async_trait]
impl IncidentStore for MockIncidentStore {
    async fn unresolved_incidents(
        &self,
        scope: ProjectScope,
    ) -> Result<Vec<IncidentRecord>, OfitecError> {
        Ok(self
            .incidents
            .lock()
            .unwrap()
            .iter()
            .filter(|i| scope.includes(i.project_id) && i.state.is_unresolved())
            .cloned()
            .collect())
    }
}

/// In-memory [`ReportStore`].
#[derive(Default)]
pub struct MockReportStore {
    reports: Mutex<Vec<ReportRecord>>,
}

impl MockReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, report: ReportRecord) {
        self.reports.lock().unwrap().push(report);
    }
}

#[async_trait]
impl ReportStore for MockReportStore {
    async fn latest_approved_report(
        &self,
        project_id: i64,
    ) -> Result<Option<ReportRecord>, OfitecError> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.project_id == project_id && r.state == ReportState::Approved)
            .max_by_key(|r| r.date)
            .cloned())
    }

    async fn count_submitted(&self) -> Result<u64, OfitecError> {
        Ok(self
            .reports
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.state == ReportState::Submitted)
            .count() as u64)
    }
}

/// Shorthand constructor for a project with an owner phone.
pub fn project(id: i64, name: &str, owner_phone: &str) -> ProjectRecord {
    ProjectRecord {
        id,
        name: name.to_string(),
        owner: Some(Recipient::new(format!("Owner {id}"), owner_phone)),
        progress: 0.0,
    }
}

/// Shorthand constructor for a risk register entry.
pub fn risk(id: i64, project_id: i64, severity: Severity, status: RiskStatus) -> RiskRecord {
    RiskRecord {
        id,
        project_id,
        name: format!("Riesgo {id}"),
        description: format!("Descripción del riesgo {id}"),
        severity,
        status,
        deadline: None,
        mitigation_plan: None,
        causes: None,
        consequences: None,
    }
}

/// Shorthand constructor for a budget snapshot.
pub fn budget(id: i64, project_id: i64, variance: f64) -> BudgetRecord {
    BudgetRecord {
        id,
        project_id,
        variance_percentage: variance,
        estimated_total_cost: 1_000_000.0 * (1.0 + variance / 100.0),
        budget_amount: 1_000_000.0,
    }
}

/// Shorthand constructor for a site incident.
pub fn incident(id: i64, project_id: i64, severity: Severity, state: IncidentState) -> IncidentRecord {
    IncidentRecord {
        id,
        project_id,
        name: format!("Incidente {id}"),
        description: format!("Descripción del incidente {id}"),
        incident_type: IncidentType::Safety,
        severity,
        state,
        deadline: None,
        preventive_action: None,
        responsible: None,
    }
}

/// Shorthand constructor for a daily report header.
pub fn report(project_id: i64, date: NaiveDate, state: ReportState) -> ReportRecord {
    ReportRecord {
        project_id,
        date,
        state,
    }
}
