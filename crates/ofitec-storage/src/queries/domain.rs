// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed implementations of the read-side domain store traits.
//!
//! The domain tables mirror the ERP entities the collectors scan. They
//! are populated by the surrounding sync process; tests seed them
//! directly through the `seed_*` helpers.

use async_trait::async_trait;
use rusqlite::{OptionalExtension, Row, params};
use std::str::FromStr;

use ofitec_core::OfitecError;
use ofitec_core::traits::{
    BudgetRecord, BudgetStore, IncidentRecord, IncidentState, IncidentStore, IncidentType,
    ProjectRecord, ProjectStore, ReportRecord, ReportState, ReportStore, RiskRecord, RiskStatus,
    RiskStore,
};
use ofitec_core::types::{ProjectScope, Recipient, Severity};

use crate::database::{Database, fmt_date, map_tr_err, parse_date};

/// All five domain stores over one database handle.
#[derive(Clone)]
pub struct SqliteDomainStores {
    db: Database,
}

impl SqliteDomainStores {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

fn conversion_err(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

fn project_from_row(row: &Row<'_>) -> rusqlite::Result<ProjectRecord> {
    let owner_name: Option<String> = row.get(2)?;
    let owner_phone: Option<String> = row.get(3)?;
    Ok(ProjectRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        owner: owner_name.map(|name| Recipient {
            name,
            phone: owner_phone,
        }),
        progress: row.get(4)?,
    })
}

fn risk_from_row(row: &Row<'_>) -> rusqlite::Result<RiskRecord> {
    let severity: String = row.get(4)?;
    let status: String = row.get(5)?;
    let deadline: Option<String> = row.get(6)?;
    Ok(RiskRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        severity: Severity::from_str(&severity).map_err(|e| conversion_err(4, e.to_string()))?,
        status: RiskStatus::from_str(&status).map_err(|e| conversion_err(5, e.to_string()))?,
        deadline: deadline.as_deref().and_then(parse_date),
        mitigation_plan: row.get(7)?,
        causes: row.get(8)?,
        consequences: row.get(9)?,
    })
}

fn incident_from_row(row: &Row<'_>) -> rusqlite::Result<IncidentRecord> {
    let incident_type: String = row.get(4)?;
    let severity: String = row.get(5)?;
    let state: String = row.get(6)?;
    let deadline: Option<String> = row.get(7)?;
    Ok(IncidentRecord {
        id: row.get(0)?,
        project_id: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        incident_type: IncidentType::from_str(&incident_type)
            .map_err(|e| conversion_err(4, e.to_string()))?,
        severity: Severity::from_str(&severity).map_err(|e| conversion_err(5, e.to_string()))?,
        state: IncidentState::from_str(&state).map_err(|e| conversion_err(6, e.to_string()))?,
        deadline: deadline.as_deref().and_then(parse_date),
        preventive_action: row.get(8)?,
        responsible: row.get(9)?,
    })
}

#[async_trait]
impl ProjectStore for SqliteDomainStores {
    async fn find_projects(&self, scope: ProjectScope) -> Result<Vec<ProjectRecord>, OfitecError> {
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, name, owner_name, owner_phone, progress FROM projects
                     WHERE ?1 IS NULL OR id = ?1
                     ORDER BY id",
                )?;
                let rows = stmt.query_map(params![scope.project_id()], project_from_row)?;
                let mut projects = Vec::new();
                for row in rows {
                    projects.push(row?);
                }
                Ok(projects)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn find_project(&self, id: i64) -> Result<Option<ProjectRecord>, OfitecError> {
        self.db
            .connection()
            .call(move |conn| {
                let project = conn
                    .query_row(
                        "SELECT id, name, owner_name, owner_phone, progress FROM projects
                         WHERE id = ?1",
                        params![id],
                        project_from_row,
                    )
                    .optional()?;
                Ok(project)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl RiskStore for SqliteDomainStores {
    async fn severe_open_risks(
        &self,
        scope: ProjectScope,
    ) -> Result<Vec<RiskRecord>, OfitecError> {
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, project_id, name, description, severity, status, deadline,
                            mitigation_plan, causes, consequences
                     FROM risks
                     WHERE severity IN ('high', 'critical')
                       AND status NOT IN ('closed', 'occurred')
                       AND (?1 IS NULL OR project_id = ?1)
                     ORDER BY id",
                )?;
                let rows = stmt.query_map(params![scope.project_id()], risk_from_row)?;
                let mut risks = Vec::new();
                for row in rows {
                    risks.push(row?);
                }
                Ok(risks)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl BudgetStore for SqliteDomainStores {
    async fn active_budgets(&self, scope: ProjectScope) -> Result<Vec<BudgetRecord>, OfitecError> {
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, project_id, variance_percentage, estimated_total_cost,
                            budget_amount
                     FROM budgets
                     WHERE state IN ('active', 'approved')
                       AND (?1 IS NULL OR project_id = ?1)
                     ORDER BY id",
                )?;
                let rows = stmt.query_map(params![scope.project_id()], |row| {
                    Ok(BudgetRecord {
                        id: row.get(0)?,
                        project_id: row.get(1)?,
                        variance_percentage: row.get(2)?,
                        estimated_total_cost: row.get(3)?,
                        budget_amount: row.get(4)?,
                    })
                })?;
                let mut budgets = Vec::new();
                for row in rows {
                    budgets.push(row?);
                }
                Ok(budgets)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl IncidentStore for SqliteDomainStores {
    async fn unresolved_incidents(
        &self,
        scope: ProjectScope,
    ) -> Result<Vec<IncidentRecord>, OfitecError> {
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, project_id, name, description, incident_type, severity, state,
                            deadline, preventive_action, responsible
                     FROM incidents
                     WHERE state NOT IN ('resolved', 'closed')
                       AND (?1 IS NULL OR project_id = ?1)
                     ORDER BY id",
                )?;
                let rows = stmt.query_map(params![scope.project_id()], incident_from_row)?;
                let mut incidents = Vec::new();
                for row in rows {
                    incidents.push(row?);
                }
                Ok(incidents)
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl ReportStore for SqliteDomainStores {
    async fn latest_approved_report(
        &self,
        project_id: i64,
    ) -> Result<Option<ReportRecord>, OfitecError> {
        self.db
            .connection()
            .call(move |conn| {
                let report = conn
                    .query_row(
                        "SELECT project_id, date, state FROM reports
                         WHERE project_id = ?1 AND state = 'approved'
                         ORDER BY date DESC LIMIT 1",
                        params![project_id],
                        |row| {
                            let date: String = row.get(1)?;
                            let state: String = row.get(2)?;
                            Ok(ReportRecord {
                                project_id: row.get(0)?,
                                date: parse_date(&date).ok_or_else(|| {
                                    conversion_err(1, format!("invalid date {date}"))
                                })?,
                                state: ReportState::from_str(&state)
                                    .map_err(|e| conversion_err(2, e.to_string()))?,
                            })
                        },
                    )
                    .optional()?;
                Ok(report)
            })
            .await
            .map_err(map_tr_err)
    }

    async fn count_submitted(&self) -> Result<u64, OfitecError> {
        self.db
            .connection()
            .call(|conn| {
                let count: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM reports WHERE state = 'submitted'",
                    [],
                    |row| row.get(0),
                )?;
                Ok(count as u64)
            })
            .await
            .map_err(map_tr_err)
    }
}

/// Insert or replace a project row.
pub async fn seed_project(db: &Database, project: &ProjectRecord) -> Result<(), OfitecError> {
    let project = project.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO projects (id, name, owner_name, owner_phone, progress)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    project.id,
                    project.name,
                    project.owner.as_ref().map(|o| o.name.clone()),
                    project.owner.as_ref().and_then(|o| o.phone.clone()),
                    project.progress,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a risk row.
pub async fn seed_risk(db: &Database, risk: &RiskRecord) -> Result<(), OfitecError> {
    let risk = risk.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO risks (id, project_id, name, description, severity,
                     status, deadline, mitigation_plan, causes, consequences)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    risk.id,
                    risk.project_id,
                    risk.name,
                    risk.description,
                    risk.severity.to_string(),
                    risk.status.to_string(),
                    risk.deadline.map(fmt_date),
                    risk.mitigation_plan,
                    risk.causes,
                    risk.consequences,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace a budget row.
pub async fn seed_budget(
    db: &Database,
    budget: &BudgetRecord,
    state: &str,
) -> Result<(), OfitecError> {
    let budget = budget.clone();
    let state = state.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO budgets (id, project_id, state, variance_percentage,
                     estimated_total_cost, budget_amount)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    budget.id,
                    budget.project_id,
                    state,
                    budget.variance_percentage,
                    budget.estimated_total_cost,
                    budget.budget_amount,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Insert or replace an incident row.
pub async fn seed_incident(db: &Database, incident: &IncidentRecord) -> Result<(), OfitecError> {
    let incident = incident.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT OR REPLACE INTO incidents (id, project_id, name, description,
                     incident_type, severity, state, deadline, preventive_action, responsible)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    incident.id,
                    incident.project_id,
                    incident.name,
                    incident.description,
                    incident.incident_type.to_string(),
                    incident.severity.to_string(),
                    incident.state.to_string(),
                    incident.deadline.map(fmt_date),
                    incident.preventive_action,
                    incident.responsible,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Append a report row.
pub async fn seed_report(db: &Database, report: &ReportRecord) -> Result<(), OfitecError> {
    let report = report.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO reports (project_id, date, state) VALUES (?1, ?2, ?3)",
                params![report.project_id, fmt_date(report.date), report.state.to_string()],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn project(id: i64, name: &str, phone: Option<&str>) -> ProjectRecord {
        ProjectRecord {
            id,
            name: name.into(),
            owner: phone.map(|p| Recipient {
                name: format!("Owner {id}"),
                phone: Some(p.into()),
            }),
            progress: 50.0,
        }
    }

    fn risk(id: i64, project_id: i64, severity: Severity, status: RiskStatus) -> RiskRecord {
        RiskRecord {
            id,
            project_id,
            name: format!("Riesgo {id}"),
            description: String::new(),
            severity,
            status,
            deadline: None,
            mitigation_plan: None,
            causes: None,
            consequences: None,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn project_scope_filters_lookups() {
        let db = Database::in_memory().await.unwrap();
        seed_project(&db, &project(1, "Torre A", Some("+56911111111")))
            .await
            .unwrap();
        seed_project(&db, &project(2, "Torre B", None)).await.unwrap();
        let stores = SqliteDomainStores::new(db);

        let all = stores.find_projects(ProjectScope::All).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(
            all[0].owner.as_ref().and_then(|o| o.phone.as_deref()),
            Some("+56911111111")
        );
        assert!(all[1].owner.is_none());

        let one = stores
            .find_projects(ProjectScope::Project(2))
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].name, "Torre B");

        assert!(stores.find_project(1).await.unwrap().is_some());
        assert!(stores.find_project(99).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn severe_open_risks_excludes_closed_and_mild() {
        let db = Database::in_memory().await.unwrap();
        seed_risk(&db, &risk(1, 1, Severity::Critical, RiskStatus::Identified))
            .await
            .unwrap();
        seed_risk(&db, &risk(2, 1, Severity::High, RiskStatus::Mitigating))
            .await
            .unwrap();
        seed_risk(&db, &risk(3, 1, Severity::Medium, RiskStatus::Identified))
            .await
            .unwrap();
        seed_risk(&db, &risk(4, 1, Severity::Critical, RiskStatus::Closed))
            .await
            .unwrap();
        seed_risk(&db, &risk(5, 2, Severity::High, RiskStatus::Assessed))
            .await
            .unwrap();
        let stores = SqliteDomainStores::new(db);

        let all = stores.severe_open_risks(ProjectScope::All).await.unwrap();
        assert_eq!(
            all.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![1, 2, 5]
        );

        let scoped = stores
            .severe_open_risks(ProjectScope::Project(2))
            .await
            .unwrap();
        assert_eq!(scoped.len(), 1);
        assert_eq!(scoped[0].id, 5);
    }

    #[tokio::test]
    async fn active_budgets_skip_drafts() {
        let db = Database::in_memory().await.unwrap();
        let b = |id, project_id, variance| BudgetRecord {
            id,
            project_id,
            variance_percentage: variance,
            estimated_total_cost: 1_000_000.0 * (1.0 + variance / 100.0),
            budget_amount: 1_000_000.0,
        };
        seed_budget(&db, &b(1, 1, 30.0), "active").await.unwrap();
        seed_budget(&db, &b(2, 1, 20.0), "approved").await.unwrap();
        seed_budget(&db, &b(3, 1, 40.0), "draft").await.unwrap();
        let stores = SqliteDomainStores::new(db);

        let budgets = stores.active_budgets(ProjectScope::All).await.unwrap();
        assert_eq!(budgets.iter().map(|b| b.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn unresolved_incidents_filter() {
        let db = Database::in_memory().await.unwrap();
        let incident = |id, state| IncidentRecord {
            id,
            project_id: 1,
            name: format!("Incidente {id}"),
            description: String::new(),
            incident_type: IncidentType::Safety,
            severity: Severity::High,
            state,
            deadline: None,
            preventive_action: None,
            responsible: None,
        };
        seed_incident(&db, &incident(1, IncidentState::Open)).await.unwrap();
        seed_incident(&db, &incident(2, IncidentState::InProgress))
            .await
            .unwrap();
        seed_incident(&db, &incident(3, IncidentState::Resolved))
            .await
            .unwrap();
        let stores = SqliteDomainStores::new(db);

        let open = stores.unresolved_incidents(ProjectScope::All).await.unwrap();
        assert_eq!(open.iter().map(|i| i.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[tokio::test]
    async fn latest_approved_report_and_submitted_count() {
        let db = Database::in_memory().await.unwrap();
        let report = |project_id, d, state| ReportRecord {
            project_id,
            date: d,
            state,
        };
        seed_report(&db, &report(1, date(2026, 3, 1), ReportState::Approved))
            .await
            .unwrap();
        seed_report(&db, &report(1, date(2026, 3, 5), ReportState::Approved))
            .await
            .unwrap();
        seed_report(&db, &report(1, date(2026, 3, 8), ReportState::Draft))
            .await
            .unwrap();
        seed_report(&db, &report(2, date(2026, 3, 7), ReportState::Submitted))
            .await
            .unwrap();
        let stores = SqliteDomainStores::new(db);

        let latest = stores.latest_approved_report(1).await.unwrap().unwrap();
        assert_eq!(latest.date, date(2026, 3, 5));

        assert!(stores.latest_approved_report(3).await.unwrap().is_none());
        assert_eq!(stores.count_submitted().await.unwrap(), 1);
    }
}
