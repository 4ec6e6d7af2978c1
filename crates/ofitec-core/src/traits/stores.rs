// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-side collaborator traits for the domain stores the collectors scan.
//!
//! Each store exposes exactly the queries the signal collectors need, so a
//! collector never reaches into an untyped environment to look models up
//! by name. Implementations live in `ofitec-storage` (SQLite) and
//! `ofitec-test-utils` (in-memory mocks).

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::OfitecError;
use crate::types::{ProjectScope, Recipient, Severity};

/// A construction project as seen by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: i64,
    pub name: String,
    /// Project owner/manager; first in line for notifications.
    pub owner: Option<Recipient>,
    /// Completion percentage, 0-100.
    pub progress: f64,
}

/// Lifecycle state of a risk register entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum RiskStatus {
    Identified,
    Assessed,
    Mitigating,
    Occurred,
    Closed,
}

impl RiskStatus {
    /// Risks already closed or materialized need no new recommendation.
    pub fn is_actionable(self) -> bool {
        !matches!(self, RiskStatus::Closed | RiskStatus::Occurred)
    }
}

/// A project risk register entry.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskRecord {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub status: RiskStatus,
    pub deadline: Option<NaiveDate>,
    pub mitigation_plan: Option<String>,
    pub causes: Option<String>,
    pub consequences: Option<String>,
}

/// A project budget snapshot with its variance against plan.
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetRecord {
    pub id: i64,
    pub project_id: i64,
    /// Deviation of estimated total cost from the approved budget, percent.
    pub variance_percentage: f64,
    pub estimated_total_cost: f64,
    pub budget_amount: f64,
}

/// Lifecycle state of a site incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum IncidentState {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl IncidentState {
    pub fn is_unresolved(self) -> bool {
        !matches!(self, IncidentState::Resolved | IncidentState::Closed)
    }
}

/// Kind of site incident, used to phrase the recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum IncidentType {
    Safety,
    Quality,
    Environmental,
    Equipment,
    Other,
}

impl IncidentType {
    /// Human-readable Spanish label, mirroring the site-report selection.
    pub fn label_es(self) -> &'static str {
        match self {
            IncidentType::Safety => "Seguridad",
            IncidentType::Quality => "Calidad",
            IncidentType::Environmental => "Medio Ambiente",
            IncidentType::Equipment => "Equipos",
            IncidentType::Other => "Otro",
        }
    }
}

/// A site incident report.
#[derive(Debug, Clone, PartialEq)]
pub struct IncidentRecord {
    pub id: i64,
    pub project_id: i64,
    pub name: String,
    pub description: String,
    pub incident_type: IncidentType,
    pub severity: Severity,
    pub state: IncidentState,
    pub deadline: Option<NaiveDate>,
    pub preventive_action: Option<String>,
    pub responsible: Option<String>,
}

/// Approval state of a daily site report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum ReportState {
    Draft,
    Submitted,
    Approved,
}

/// A daily site report header.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRecord {
    pub project_id: i64,
    pub date: NaiveDate,
    pub state: ReportState,
}

/// Project directory lookups.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    /// Projects within the given scope.
    async fn find_projects(&self, scope: ProjectScope) -> Result<Vec<ProjectRecord>, OfitecError>;

    /// A single project by id, if it exists.
    async fn find_project(&self, id: i64) -> Result<Option<ProjectRecord>, OfitecError>;
}

/// Risk register lookups.
#[async_trait]
pub trait RiskStore: Send + Sync {
    /// Risks with severity high/critical whose status is still actionable.
    async fn severe_open_risks(&self, scope: ProjectScope)
    -> Result<Vec<RiskRecord>, OfitecError>;
}

/// Budget tracking lookups.
#[async_trait]
pub trait BudgetStore: Send + Sync {
    /// Budgets in active or approved state.
    async fn active_budgets(&self, scope: ProjectScope) -> Result<Vec<BudgetRecord>, OfitecError>;
}

/// Site incident lookups.
#[async_trait]
pub trait IncidentStore: Send + Sync {
    /// Incidents not yet resolved or closed.
    async fn unresolved_incidents(
        &self,
        scope: ProjectScope,
    ) -> Result<Vec<IncidentRecord>, OfitecError>;
}

/// Daily report lookups.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Most recent approved report for a project, if any.
    async fn latest_approved_report(
        &self,
        project_id: i64,
    ) -> Result<Option<ReportRecord>, OfitecError>;

    /// Number of reports waiting for approval across all projects.
    async fn count_submitted(&self) -> Result<u64, OfitecError>;
}
