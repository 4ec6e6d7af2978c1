// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message audit trail operations.
//!
//! Every delivery attempt, inbound and outbound, gets a row. Rows are
//! never deleted; purging an action only nulls the back-reference.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Row, params};
use std::str::FromStr;

use ofitec_core::OfitecError;
use ofitec_core::types::{
    DeliveryStatus, Direction, MessageType, NotificationMessage, ProviderMessageId,
};

use crate::database::{Database, fmt_date, fmt_ts, map_tr_err, parse_ts};

const MESSAGE_COLUMNS: &str = "id, direction, action_id, from_phone, to_phone, body, \
     message_type, status, provider_message_id, retry_count, error_message, created_at, \
     sent_at, delivered_at, read_at";

fn conversion_err(idx: usize, msg: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, msg.into())
}

fn message_from_row(row: &Row<'_>) -> rusqlite::Result<NotificationMessage> {
    let direction: String = row.get(1)?;
    let message_type: String = row.get(6)?;
    let status: String = row.get(7)?;
    let created_at: String = row.get(11)?;
    let sent_at: Option<String> = row.get(12)?;
    let delivered_at: Option<String> = row.get(13)?;
    let read_at: Option<String> = row.get(14)?;

    Ok(NotificationMessage {
        id: row.get(0)?,
        direction: Direction::from_str(&direction)
            .map_err(|e| conversion_err(1, e.to_string()))?,
        action_id: row.get(2)?,
        from_phone: row.get(3)?,
        to_phone: row.get(4)?,
        body: row.get(5)?,
        message_type: MessageType::from_str(&message_type)
            .map_err(|e| conversion_err(6, e.to_string()))?,
        status: DeliveryStatus::from_str(&status).map_err(|e| conversion_err(7, e.to_string()))?,
        provider_message_id: row.get(8)?,
        retry_count: row.get(9)?,
        error_message: row.get(10)?,
        created_at: parse_ts(&created_at)
            .ok_or_else(|| conversion_err(11, format!("invalid timestamp {created_at}")))?,
        sent_at: sent_at.as_deref().and_then(parse_ts),
        delivered_at: delivered_at.as_deref().and_then(parse_ts),
        read_at: read_at.as_deref().and_then(parse_ts),
    })
}

/// Record a queued outbound message before the send attempt.
pub async fn insert_outbound(
    db: &Database,
    action_id: Option<i64>,
    to_phone: &str,
    body: &str,
    message_type: MessageType,
    now: DateTime<Utc>,
) -> Result<i64, OfitecError> {
    let to_phone = to_phone.to_string();
    let body = body.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (direction, action_id, to_phone, body, message_type,
                     status, created_at)
                 VALUES ('outbound', ?1, ?2, ?3, ?4, 'pending', ?5)",
                params![action_id, to_phone, body, message_type.to_string(), fmt_ts(now)],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Record an inbound message from the provider webhook.
pub async fn record_inbound(
    db: &Database,
    action_id: Option<i64>,
    from_phone: &str,
    body: &str,
    message_type: MessageType,
    provider_id: &ProviderMessageId,
    now: DateTime<Utc>,
) -> Result<i64, OfitecError> {
    let from_phone = from_phone.to_string();
    let body = body.to_string();
    let provider_id = provider_id.0.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO messages (direction, action_id, from_phone, body, message_type,
                     status, provider_message_id, created_at, delivered_at)
                 VALUES ('inbound', ?1, ?2, ?3, ?4, 'delivered', ?5, ?6, ?6)",
                params![
                    action_id,
                    from_phone,
                    body,
                    message_type.to_string(),
                    provider_id,
                    fmt_ts(now),
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(map_tr_err)
}

/// Mark an outbound attempt as sent: stamp the provider id and clear any
/// previous error. The retry counter is untouched; the initial send does
/// not count against the retry budget.
pub async fn mark_sent(
    db: &Database,
    id: i64,
    provider_id: &ProviderMessageId,
    now: DateTime<Utc>,
) -> Result<bool, OfitecError> {
    let provider_id = provider_id.0.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE messages
                 SET status = 'sent', provider_message_id = ?1, sent_at = ?2,
                     error_message = NULL
                 WHERE id = ?3",
                params![provider_id, fmt_ts(now), id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Mark an outbound attempt as failed, keeping the error for diagnosis.
pub async fn mark_send_failed(
    db: &Database,
    id: i64,
    error: &str,
) -> Result<bool, OfitecError> {
    let error = error.to_string();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE messages
                 SET status = 'failed', error_message = ?1
                 WHERE id = ?2",
                params![error, id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Consume one retry slot before a re-send attempt. Only the retry pass
/// calls this; a message failed on its initial send still has the full
/// budget of [`MAX_RETRIES`](ofitec_core::types::MAX_RETRIES) re-sends.
pub async fn bump_retry(db: &Database, id: i64) -> Result<bool, OfitecError> {
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "UPDATE messages SET retry_count = retry_count + 1 WHERE id = ?1",
                params![id],
            )?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Fetch one message by id.
pub async fn get(db: &Database, id: i64) -> Result<Option<NotificationMessage>, OfitecError> {
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {MESSAGE_COLUMNS} FROM messages WHERE id = ?1"))?;
            let mut rows = stmt.query_map(params![id], message_from_row)?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Look up the outbound message a provider id was assigned to. Inbound
/// replies quote this id, which is how commands find their action.
pub async fn find_outbound_by_provider_id(
    db: &Database,
    provider_id: &ProviderMessageId,
) -> Result<Option<NotificationMessage>, OfitecError> {
    let provider_id = provider_id.0.clone();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE direction = 'outbound' AND provider_message_id = ?1
                 ORDER BY id DESC LIMIT 1"
            ))?;
            let mut rows = stmt.query_map(params![provider_id], message_from_row)?;
            match rows.next() {
                Some(row) => Ok(Some(row?)),
                None => Ok(None),
            }
        })
        .await
        .map_err(map_tr_err)
}

/// Apply a provider delivery-status callback to the matching outbound
/// message. Unknown provider ids are ignored.
pub async fn apply_status(
    db: &Database,
    provider_id: &ProviderMessageId,
    status: DeliveryStatus,
    now: DateTime<Utc>,
) -> Result<bool, OfitecError> {
    let provider_id = provider_id.0.clone();
    let stamp_column = match status {
        DeliveryStatus::Sent => Some("sent_at"),
        DeliveryStatus::Delivered => Some("delivered_at"),
        DeliveryStatus::Read => Some("read_at"),
        DeliveryStatus::Pending | DeliveryStatus::Failed => None,
    };
    db.connection()
        .call(move |conn| {
            let changed = match stamp_column {
                Some(column) => conn.execute(
                    &format!(
                        "UPDATE messages SET status = ?1, {column} = ?2
                         WHERE direction = 'outbound' AND provider_message_id = ?3"
                    ),
                    params![status.to_string(), fmt_ts(now), provider_id],
                )?,
                None => conn.execute(
                    "UPDATE messages SET status = ?1
                     WHERE direction = 'outbound' AND provider_message_id = ?2",
                    params![status.to_string(), provider_id],
                )?,
            };
            Ok(changed > 0)
        })
        .await
        .map_err(map_tr_err)
}

/// Failed outbound messages still under the retry bound, oldest first.
pub async fn retryable_failed(
    db: &Database,
    limit: usize,
) -> Result<Vec<NotificationMessage>, OfitecError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {MESSAGE_COLUMNS} FROM messages
                 WHERE direction = 'outbound' AND status = 'failed'
                   AND retry_count < {}
                 ORDER BY id ASC LIMIT ?1",
                ofitec_core::types::MAX_RETRIES
            ))?;
            let rows = stmt.query_map(params![limit as i64], message_from_row)?;
            let mut messages = Vec::new();
            for row in rows {
                messages.push(row?);
            }
            Ok(messages)
        })
        .await
        .map_err(map_tr_err)
}

/// Daily traffic counters for the status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DailyTraffic {
    pub sent: i64,
    pub received: i64,
}

/// Messages created today, split by direction.
pub async fn traffic_for_day(db: &Database, day: NaiveDate) -> Result<DailyTraffic, OfitecError> {
    let day_start = format!("{}T00:00:00.000Z", fmt_date(day));
    let day_end = format!("{}T23:59:59.999Z", fmt_date(day));
    db.connection()
        .call(move |conn| {
            let sent: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages
                 WHERE direction = 'outbound' AND created_at BETWEEN ?1 AND ?2",
                params![day_start, day_end],
                |row| row.get(0),
            )?;
            let received: i64 = conn.query_row(
                "SELECT COUNT(*) FROM messages
                 WHERE direction = 'inbound' AND created_at BETWEEN ?1 AND ?2",
                params![day_start, day_end],
                |row| row.get(0),
            )?;
            Ok(DailyTraffic { sent, received })
        })
        .await
        .map_err(map_tr_err)
}
