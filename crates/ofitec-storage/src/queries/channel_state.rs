// SPDX-FileCopyrightText: 2026 OFITEC Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persisted fixed-window rate limiter state, one row per channel.

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension, params};

use ofitec_core::OfitecError;

use crate::database::{Database, fmt_ts, map_tr_err, parse_ts};

/// Window length. A counter older than this is reset on the next acquire.
const WINDOW_SECS: i64 = 3600;

/// Create the state row for `channel` if missing and sync its limit to
/// the configured value.
pub async fn ensure(db: &Database, channel: &str, rate_limit: i64) -> Result<(), OfitecError> {
    let channel = channel.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO channel_state (channel, rate_limit) VALUES (?1, ?2)
                 ON CONFLICT(channel) DO UPDATE SET rate_limit = excluded.rate_limit",
                params![channel, rate_limit],
            )?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)
}

/// Try to take one send slot for `channel`.
///
/// Counter semantics: if more than an hour passed since the last
/// request the window restarts at one. Otherwise the request is
/// rejected once the count reached the limit, and counted and stamped
/// when it did not. Runs as a single transaction so concurrent callers
/// on the shared writer thread cannot double-spend a slot.
pub async fn try_acquire(
    db: &Database,
    channel: &str,
    now: DateTime<Utc>,
) -> Result<bool, OfitecError> {
    let channel = channel.to_string();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let row: Option<(i64, i64, i64, Option<String>)> = tx
                .query_row(
                    "SELECT id, rate_limit, request_count, last_request
                     FROM channel_state WHERE channel = ?1",
                    params![channel],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
                )
                .optional()?;

            let Some((id, rate_limit, request_count, last_request)) = row else {
                // No state row means the channel was never registered;
                // fail open rather than silence all sends.
                return Ok(true);
            };

            let elapsed = last_request
                .as_deref()
                .and_then(parse_ts)
                .map(|last| (now - last).num_seconds());

            let fresh_window = match elapsed {
                None => true,
                Some(secs) => secs > WINDOW_SECS,
            };

            let allowed = if fresh_window {
                tx.execute(
                    "UPDATE channel_state SET request_count = 1, last_request = ?1 WHERE id = ?2",
                    params![fmt_ts(now), id],
                )?;
                true
            } else if request_count >= rate_limit {
                false
            } else {
                tx.execute(
                    "UPDATE channel_state
                     SET request_count = request_count + 1, last_request = ?1
                     WHERE id = ?2",
                    params![fmt_ts(now), id],
                )?;
                true
            };

            tx.commit()?;
            Ok(allowed)
        })
        .await
        .map_err(map_tr_err)
}

/// Current counter for diagnostics.
pub async fn current_count(db: &Database, channel: &str) -> Result<Option<i64>, OfitecError> {
    let channel = channel.to_string();
    db.connection()
        .call(move |conn| {
            let count = conn
                .query_row(
                    "SELECT request_count FROM channel_state WHERE channel = ?1",
                    params![channel],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(count)
        })
        .await
        .map_err(map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn acquire_counts_up_to_limit() {
        let db = Database::in_memory().await.unwrap();
        ensure(&db, "whatsapp", 3).await.unwrap();

        for _ in 0..3 {
            assert!(try_acquire(&db, "whatsapp", now()).await.unwrap());
        }
        assert!(!try_acquire(&db, "whatsapp", now()).await.unwrap());
        assert_eq!(current_count(&db, "whatsapp").await.unwrap(), Some(3));
    }

    #[tokio::test]
    async fn window_resets_after_an_hour() {
        let db = Database::in_memory().await.unwrap();
        ensure(&db, "whatsapp", 1).await.unwrap();

        assert!(try_acquire(&db, "whatsapp", now()).await.unwrap());
        assert!(!try_acquire(&db, "whatsapp", now()).await.unwrap());

        // Exactly one hour later the window is still closed.
        let edge = now() + Duration::seconds(3600);
        assert!(!try_acquire(&db, "whatsapp", edge).await.unwrap());

        let later = now() + Duration::seconds(3601);
        assert!(try_acquire(&db, "whatsapp", later).await.unwrap());
        assert_eq!(current_count(&db, "whatsapp").await.unwrap(), Some(1));
    }

    #[tokio::test]
    async fn unregistered_channel_fails_open() {
        let db = Database::in_memory().await.unwrap();
        assert!(try_acquire(&db, "unknown", now()).await.unwrap());
    }

    #[tokio::test]
    async fn ensure_updates_limit_without_resetting_count() {
        let db = Database::in_memory().await.unwrap();
        ensure(&db, "whatsapp", 1).await.unwrap();
        assert!(try_acquire(&db, "whatsapp", now()).await.unwrap());
        assert!(!try_acquire(&db, "whatsapp", now()).await.unwrap());

        ensure(&db, "whatsapp", 5).await.unwrap();
        assert_eq!(current_count(&db, "whatsapp").await.unwrap(), Some(1));
        assert!(try_acquire(&db, "whatsapp", now()).await.unwrap());
    }
}
