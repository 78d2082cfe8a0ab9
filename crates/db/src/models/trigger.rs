//! Trigger entity model and DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vigil_core::types::{DbId, Timestamp};

/// A row from the `triggers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Trigger {
    pub id: DbId,
    pub will_id: DbId,
    /// One of `inactivity`, `date`, `manual` (see `vigil_core::TriggerKind`).
    pub kind: String,
    pub trigger_date: Option<NaiveDate>,
    pub is_raised: bool,
    pub description: Option<String>,
    pub last_checked: Option<Timestamp>,
    /// One of `pending`, `completed`, `failed` (see `vigil_core::TriggerStatus`).
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a trigger.
#[derive(Debug, Deserialize)]
pub struct CreateTrigger {
    pub will_id: DbId,
    pub kind: String,
    pub trigger_date: Option<NaiveDate>,
    pub description: Option<String>,
}

/// A pending trigger joined with its owning will, as scanned by the sweep.
///
/// `will_is_triggered` is carried so the orchestrator can tell a first
/// firing from the finish-up of a unit whose claim committed on an earlier
/// sweep.
#[derive(Debug, Clone, FromRow)]
pub struct DueCandidate {
    pub trigger_id: DbId,
    pub kind: String,
    pub trigger_date: Option<NaiveDate>,
    pub is_raised: bool,
    pub will_id: DbId,
    pub will_subject: String,
    pub check_in_interval_days: Option<i32>,
    pub last_check_in: Timestamp,
    pub will_is_triggered: bool,
}
