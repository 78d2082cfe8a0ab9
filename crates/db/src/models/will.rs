//! Will entity model and DTOs.
//!
//! A will is one dead man's switch unit: the owner's check-in state, the
//! activation flags, and (via the `messages` table) the payloads released
//! when it fires.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vigil_core::types::{DbId, Timestamp};

/// A row from the `wills` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Will {
    pub id: DbId,
    pub user_id: DbId,
    pub subject: String,
    /// Legacy single-payload body; per-recipient payloads live in `messages`.
    pub body: String,
    /// `None` when the will is driven purely by date/manual triggers.
    pub check_in_interval_days: Option<i32>,
    pub last_check_in: Timestamp,
    pub is_active: bool,
    /// One-way flag set by the sweep's claim. Never cleared.
    pub is_triggered: bool,
    pub triggered_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// DTO for creating a will.
#[derive(Debug, Deserialize)]
pub struct CreateWill {
    pub user_id: DbId,
    pub subject: String,
    pub body: String,
    pub check_in_interval_days: Option<i32>,
}
