//! Dispatch log entity model.
//!
//! Append-only audit trail of delivery attempts. Rows are inserted by the
//! sweep (status `sent` or `failed`) and advanced by external receipt
//! confirmations (`delivered`, `read`), never moved backwards.

use serde::Serialize;
use sqlx::FromRow;
use vigil_core::types::{DbId, Timestamp};

/// A row from the `dispatch_log` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DispatchLogEntry {
    pub id: DbId,
    pub will_id: DbId,
    pub message_id: DbId,
    pub recipient_email: String,
    /// One of `pending`, `sent`, `delivered`, `read`, `failed`
    /// (see `vigil_core::DispatchStatus`).
    pub status: String,
    pub sent_at: Option<Timestamp>,
    pub delivered_at: Option<Timestamp>,
    pub read_at: Option<Timestamp>,
    pub error: Option<String>,
    pub created_at: Timestamp,
}
