//! Repository for the `dispatch_log` table.
//!
//! The status guards in the UPDATEs here mirror the transition table in
//! `vigil_core::DispatchStatus`: rows only ever move forward.

use sqlx::PgPool;
use vigil_core::types::{DbId, Timestamp};

use crate::models::dispatch_log::DispatchLogEntry;

/// Column list for `dispatch_log` queries.
const COLUMNS: &str = "id, will_id, message_id, recipient_email, status, \
    sent_at, delivered_at, read_at, error, created_at";

/// Provides operations for dispatch log records.
pub struct DispatchLogRepo;

impl DispatchLogRepo {
    /// Record a successful send: set the message's one-way sent flag and
    /// append a `sent` log row, atomically.
    ///
    /// Returns `false` without logging anything if the message was already
    /// marked sent, so a duplicate attempt can never produce a second
    /// `sent` row.
    pub async fn record_sent(
        pool: &PgPool,
        will_id: DbId,
        message_id: DbId,
        recipient_email: &str,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let updated = sqlx::query(
            "UPDATE messages \
             SET is_sent = TRUE, sent_at = $2 \
             WHERE id = $1 AND is_sent = FALSE",
        )
        .bind(message_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            // Dropping the transaction rolls it back.
            return Ok(false);
        }

        sqlx::query(
            "INSERT INTO dispatch_log (will_id, message_id, recipient_email, status, sent_at) \
             VALUES ($1, $2, $3, 'sent', $4)",
        )
        .bind(will_id)
        .bind(message_id)
        .bind(recipient_email)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    /// Append a `failed` log row for a send attempt that did not go out.
    ///
    /// The message itself stays unsent so a later pass retries it.
    pub async fn record_failed(
        pool: &PgPool,
        will_id: DbId,
        message_id: DbId,
        recipient_email: &str,
        error: &str,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO dispatch_log (will_id, message_id, recipient_email, status, error) \
             VALUES ($1, $2, $3, 'failed', $4)",
        )
        .bind(will_id)
        .bind(message_id)
        .bind(recipient_email)
        .bind(error)
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Record a delivery receipt on a `sent` row.
    ///
    /// Returns `false` if the row already advanced past `sent` (or failed),
    /// leaving it untouched.
    pub async fn mark_delivered(
        pool: &PgPool,
        id: DbId,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE dispatch_log \
             SET status = 'delivered', delivered_at = $2 \
             WHERE id = $1 AND status = 'sent'",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record a read receipt.
    ///
    /// A read receipt can arrive before any delivery receipt, in which case
    /// `delivered_at` is backfilled with the same instant.
    pub async fn mark_read(pool: &PgPool, id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE dispatch_log \
             SET status = 'read', read_at = $2, delivered_at = COALESCE(delivered_at, $2) \
             WHERE id = $1 AND status IN ('sent', 'delivered')",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List the dispatch log of a will, oldest first.
    pub async fn list_for_will(
        pool: &PgPool,
        will_id: DbId,
    ) -> Result<Vec<DispatchLogEntry>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM dispatch_log WHERE will_id = $1 ORDER BY id");
        sqlx::query_as::<_, DispatchLogEntry>(&query)
            .bind(will_id)
            .fetch_all(pool)
            .await
    }
}
