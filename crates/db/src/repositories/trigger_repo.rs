//! Repository for the `triggers` table.

use sqlx::PgPool;
use vigil_core::types::{DbId, Timestamp};

use crate::models::trigger::{CreateTrigger, DueCandidate, Trigger};

/// Column list for `triggers` queries.
const COLUMNS: &str = "id, will_id, kind, trigger_date, is_raised, description, \
    last_checked, status, created_at, updated_at";

/// Provides operations for trigger records.
pub struct TriggerRepo;

impl TriggerRepo {
    /// Insert a new trigger in `pending` status.
    pub async fn create(pool: &PgPool, input: &CreateTrigger) -> Result<Trigger, sqlx::Error> {
        let query = format!(
            "INSERT INTO triggers (will_id, kind, trigger_date, description) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Trigger>(&query)
            .bind(input.will_id)
            .bind(&input.kind)
            .bind(input.trigger_date)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find a trigger by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Trigger>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM triggers WHERE id = $1");
        sqlx::query_as::<_, Trigger>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List every pending trigger joined with its active owning will.
    ///
    /// This is the sweep's scan set. Terminal triggers and wills that were
    /// deactivated never appear; wills that already triggered still do, so
    /// a unit interrupted after its claim can be finished on a later pass.
    pub async fn list_pending(pool: &PgPool) -> Result<Vec<DueCandidate>, sqlx::Error> {
        sqlx::query_as::<_, DueCandidate>(
            "SELECT t.id AS trigger_id, t.kind, t.trigger_date, t.is_raised, \
                    w.id AS will_id, w.subject AS will_subject, \
                    w.check_in_interval_days, w.last_check_in, \
                    w.is_triggered AS will_is_triggered \
             FROM triggers t \
             JOIN wills w ON w.id = t.will_id \
             WHERE t.status = 'pending' AND w.is_active = TRUE \
             ORDER BY t.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Count pending triggers whose will row no longer exists.
    ///
    /// The foreign key cascade normally makes this zero; a non-zero count
    /// means the constraint was dropped or rows were patched by hand. The
    /// sweep surfaces it as a warning because such triggers silently fall
    /// out of [`Self::list_pending`].
    pub async fn count_orphaned(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM triggers t \
             LEFT JOIN wills w ON w.id = t.will_id \
             WHERE t.status = 'pending' AND w.id IS NULL",
        )
        .fetch_one(pool)
        .await
    }

    /// Stamp `last_checked` on every pending trigger the sweep considered,
    /// i.e. those whose will is active.
    ///
    /// Returns the number of rows touched.
    pub async fn touch_scanned(pool: &PgPool, now: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE triggers t \
             SET last_checked = $1 \
             WHERE t.status = 'pending' \
               AND EXISTS (SELECT 1 FROM wills w WHERE w.id = t.will_id AND w.is_active = TRUE)",
        )
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Transition a pending trigger to `completed`.
    ///
    /// Returns `false` if the trigger was not pending, which means another
    /// pass already finished it.
    pub async fn complete(pool: &PgPool, id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE triggers \
             SET status = 'completed', last_checked = $2, updated_at = $2 \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition a pending trigger to `failed`.
    ///
    /// The sweep never abandons a unit; this transition is for an operator
    /// or the owning service to retire a trigger that can never deliver.
    /// Per-message failures live in `dispatch_log`.
    pub async fn fail(pool: &PgPool, id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE triggers \
             SET status = 'failed', last_checked = $2, updated_at = $2 \
             WHERE id = $1 AND status = 'pending'",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Raise the manual flag on a pending manual trigger.
    ///
    /// Called from outside the sweep (the owner's agent, a trusted contact).
    /// Returns `false` for triggers of another kind or no longer pending.
    pub async fn raise_manual(pool: &PgPool, id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE triggers \
             SET is_raised = TRUE, updated_at = $2 \
             WHERE id = $1 AND kind = 'manual' AND status = 'pending'",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
