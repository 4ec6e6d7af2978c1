// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Action table operations.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Row, params};
use std::str::FromStr;

use ofitec_core::types::{
    Action, ActionCategory, ActionDraft, ActionStatus, ActionType, Priority, Recipient, SourceRef,
};
use ofitec_core::OfitecError;

use crate::database::{Database, fmt_date, fmt_ts, map_tr_err, parse_date, parse_ts};

const ACTION_COLUMNS: &str = "id, title, description, action_type, priority, category, status, \
     project_id, risk_id, incident_id, budget_id, confidence_score, impact_score, urgency_score, \
     recommended_actions, expected_benefits, required_resources, suggested_date, deadline, \
     completed_date, engine, notify_enabled, notified, recipients, assignee_name, assignee_phone, \
     created_at";

/// Aggregate counts surfaced on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionCounts {
    pub pending: i64,
    pub in_progress: i64,
    pub completed_today: i64,
    pub critical_pending: i64,
    pub high_pending: i64,
}

fn conversion_err(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

fn action_from_row(row: &Row<'_>) -> rusqlite::Result<Action> {
    let action_type: String = row.get(3)?;
    let priority: i64 = row.get(4)?;
    let category: String = row.get(5)?;
    let status: String = row.get(6)?;
    let suggested_date: String = row.get(17)?;
    let deadline: Option<String> = row.get(18)?;
    let completed_date: Option<String> = row.get(19)?;
    let recipients: String = row.get(23)?;
    let assignee_name: Option<String> = row.get(24)?;
    let assignee_phone: Option<String> = row.get(25)?;
    let created_at: String = row.get(26)?;

    Ok(Action {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        action_type: ActionType::from_str(&action_type)
            .map_err(|e| conversion_err(3, e.to_string()))?,
        priority: Priority::from_rank(priority as u8)
            .ok_or_else(|| conversion_err(4, format!("invalid priority {priority}")))?,
        category: ActionCategory::from_str(&category)
            .map_err(|e| conversion_err(5, e.to_string()))?,
        status: ActionStatus::from_str(&status).map_err(|e| conversion_err(6, e.to_string()))?,
        source: SourceRef {
            project_id: row.get(7)?,
            risk_id: row.get(8)?,
            incident_id: row.get(9)?,
            budget_id: row.get(10)?,
        },
        confidence_score: row.get(11)?,
        impact_score: row.get(12)?,
        urgency_score: row.get(13)?,
        recommended_actions: row.get(14)?,
        expected_benefits: row.get(15)?,
        required_resources: row.get(16)?,
        suggested_date: parse_date(&suggested_date)
            .ok_or_else(|| conversion_err(17, format!("invalid date {suggested_date}")))?,
        deadline: deadline.as_deref().and_then(parse_date),
        completed_date: completed_date.as_deref().and_then(parse_ts),
        engine: row.get(20)?,
        notify_enabled: row.get(21)?,
        notified: row.get(22)?,
        recipients: serde_json::from_str(&recipients)
            .map_err(|e| conversion_err(23, e.to_string()))?,
        assignee: assignee_name.map(|name| Recipient {
            name,
            phone: assignee_phone,
        }),
        created_at: parse_ts(&created_at)
            .ok_or_else(|| conversion_err(26, format!("invalid timestamp {created_at}")))?,
    })
}

/// Persist a collector draft as a pending action. Returns the new id.
pub async fn insert(
    db: &Database,
    draft: &ActionDraft,
    now: DateTime<Utc>,
) -> Result<i64, OfitecError> {
    let draft = draft.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO actions (title, description, action_type, priority, category,
                     status, project_id, risk_id, incident_id, budget_id, confidence_score,
                     impact_score, urgency_score, recommended_actions, expected_benefits,
                     required_resources, suggested_date, deadline, engine, assignee_name,
                     assignee_phone, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                     ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
                params![
                    draft.title,
                    draft.description,
                    draft.action_type.to_string(),
                    draft.priority.rank(),
                    draft.category.to_string(),
                    draft.source.project_id,
                    draft.source.risk_id,
                    draft.source.incident_id,
                    draft.source.budget_id,
                    draft.confidence_score,
                    draft.impact_score,
                    draft.urgency_score,
                    draft.recommended_actions,
                    draft.expected_benefits,
                    draft.required_resources,
                    fmt_date(draft.suggested_date),
                    draft.deadline.map(fmt_date),
                    draft.engine,
                    draft.assignee.as_ref().map(|a| a.name.clone()),
                    draft.assignee.as_ref().and_then(|a| a.phone.clone()),
                    fmt_ts(now),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one action by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<Action>, OfitecError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {ACTION_COLUMNS} FROM actions WHERE id = ?1"))?;
            let mut rows = stmt.query_map(params![id], action_from_row)?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Write a new status (last write wins). Returns whether a row changed.
pub async fn update_status(
    db: &Database,
    id: i64,
    status: ActionStatus,
    completed_date: Option<DateTime<Utc>>,
) -> Result<bool, OfitecError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE actions SET status = ?1, completed_date = ?2 WHERE id = ?3",
                params![status.to_string(), completed_date.map(fmt_ts), id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Flag an action as notified after at least one delivery succeeded.
pub async fn mark_notified(db: &Database, id: i64) -> Result<bool, OfitecError> {
    db.connection()
        .call(move |conn| {
            let changed =
                conn.execute("UPDATE actions SET notified = 1 WHERE id = ?1", params![id])?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Replace the explicit recipient list.
pub async fn set_recipients(
    db: &Database,
    id: i64,
    recipients: &[Recipient],
) -> Result<bool, OfitecError> {
    let json = serde_json::to_string(recipients)
        .map_err(|e| OfitecError::Internal(format!("recipient serialization: {e}")))?;
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE actions SET recipients = ?1 WHERE id = ?2",
                params![json, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Assign (or clear) the responsible user.
pub async fn set_assignee(
    db: &Database,
    id: i64,
    assignee: Option<&Recipient>,
) -> Result<bool, OfitecError> {
    let name = assignee.map(|a| a.name.clone());
    let phone = assignee.and_then(|a| a.phone.clone());
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE actions SET assignee_name = ?1, assignee_phone = ?2 WHERE id = ?3",
                params![name, phone, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Pending priority 1-2 actions with notifications enabled and not yet
/// sent, oldest first. Feeds the urgent-reminder sweep.
pub async fn pending_unnotified(db: &Database, limit: usize) -> Result<Vec<Action>, OfitecError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTION_COLUMNS} FROM actions
                 WHERE status = 'pending' AND priority <= 2
                   AND notify_enabled = 1 AND notified = 0
                 ORDER BY id ASC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit as i64], action_from_row)?;
            let mut actions = Vec::new();
            for row in rows {
                actions.push(row?);
            }
            Ok(actions)
        })
        .await
        .map_err(map_tr_err)
}

/// Top pending urgent actions for the dashboard, by priority then
/// suggested date.
pub async fn urgent_pending(db: &Database, limit: usize) -> Result<Vec<Action>, OfitecError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {ACTION_COLUMNS} FROM actions
                 WHERE status = 'pending' AND priority <= 2
                 ORDER BY priority ASC, suggested_date ASC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![limit as i64], action_from_row)?;
            let mut actions = Vec::new();
            for row in rows {
                actions.push(row?);
            }
            Ok(actions)
        })
        .await
        .map_err(map_tr_err)
}

/// Delete terminal actions created before `cutoff`. Returns rows deleted.
pub async fn purge_stale(db: &Database, cutoff: DateTime<Utc>) -> Result<usize, OfitecError> {
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute(
                "DELETE FROM actions
                 WHERE status IN ('completed', 'cancelled') AND created_at < ?1",
                params![fmt_ts(cutoff)],
            )?;
            Ok(deleted)
        })
        .await
        .map_err(map_tr_err)
}

/// Whether a pending action already exists for the same category and
/// source references. Backs the aggregator's optional deduplication.
pub async fn exists_pending_for_source(
    db: &Database,
    category: ActionCategory,
    source: SourceRef,
) -> Result<bool, OfitecError> {
    db.connection()
        .call(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM actions
                 WHERE status = 'pending' AND category = ?1
                   AND COALESCE(project_id, -1) = COALESCE(?2, -1)
                   AND COALESCE(risk_id, -1) = COALESCE(?3, -1)
                   AND COALESCE(incident_id, -1) = COALESCE(?4, -1)
                   AND COALESCE(budget_id, -1) = COALESCE(?5, -1)",
                params![
                    category.to_string(),
                    source.project_id,
                    source.risk_id,
                    source.incident_id,
                    source.budget_id,
                ],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Dashboard aggregate counts for the given day.
pub async fn counts(db: &Database, today: NaiveDate) -> Result<ActionCounts, OfitecError> {
    let day_start = format!("{}T00:00:00.000Z", fmt_date(today));
    let day_end = format!("{}T23:59:59.999Z", fmt_date(today));
    db.connection()
        .call(move |conn| {
            let one = |sql: &str, params: &[&dyn rusqlite::ToSql]| -> rusqlite::Result<i64> {
                conn.query_row(sql, params, |row| row.get(0))
            };
            Ok(ActionCounts {
                pending: one("SELECT COUNT(*) FROM actions WHERE status = 'pending'", &[])?,
                in_progress: one(
                    "SELECT COUNT(*) FROM actions WHERE status = 'in_progress'",
                    &[],
                )?,
                completed_today: one(
                    "SELECT COUNT(*) FROM actions
                     WHERE status = 'completed' AND completed_date BETWEEN ?1 AND ?2",
                    &[&day_start, &day_end],
                )?,
                critical_pending: one(
                    "SELECT COUNT(*) FROM actions WHERE status = 'pending' AND priority = 1",
                    &[],
                )?,
                high_pending: one(
                    "SELECT COUNT(*) FROM actions WHERE status = 'pending' AND priority = 2",
                    &[],
                )?,
            })
        })
        .await
        .map_err(map_tr_err)
}

/// Delete one action. Message history keeps its rows, back-reference nulled.
pub async fn delete(db: &Database, id: i64) -> Result<bool, OfitecError> {
    db.connection()
        .call(move |conn| {
            let deleted = conn.execute("DELETE FROM actions WHERE id = ?1", params![id])?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_tr_err)
}
