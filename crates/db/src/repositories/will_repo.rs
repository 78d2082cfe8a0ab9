//! Repository for the `wills` table.
//!
//! The claim is the heart of at-most-once firing: flipping `is_triggered`
//! is a conditional UPDATE checked via `rows_affected`, so of any number of
//! concurrent claimants exactly one wins.

use sqlx::PgPool;
use vigil_core::types::{DbId, Timestamp};

use crate::models::will::{CreateWill, Will};

/// Column list for `wills` queries.
const COLUMNS: &str = "id, user_id, subject, body, check_in_interval_days, last_check_in, \
    is_active, is_triggered, triggered_at, created_at";

/// Provides operations for will records.
pub struct WillRepo;

impl WillRepo {
    /// Insert a new will. `last_check_in` starts at the insertion time.
    pub async fn create(pool: &PgPool, input: &CreateWill) -> Result<Will, sqlx::Error> {
        let query = format!(
            "INSERT INTO wills (user_id, subject, body, check_in_interval_days) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Will>(&query)
            .bind(input.user_id)
            .bind(&input.subject)
            .bind(&input.body)
            .bind(input.check_in_interval_days)
            .fetch_one(pool)
            .await
    }

    /// Find a will by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Will>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM wills WHERE id = $1");
        sqlx::query_as::<_, Will>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Claim a will for dispatch by flipping its one-way `is_triggered` flag.
    ///
    /// The claim only lands if the will is still active and not yet
    /// triggered. For inactivity units the caller additionally passes the
    /// `last_check_in` the due evaluation was based on; a check-in racing
    /// the sweep then makes the claim miss, so the freshened deadline is
    /// honored and the trigger stays pending for the next pass. Date and
    /// manual units pass `None` because check-ins do not defuse them.
    ///
    /// Returns `true` if this caller won the claim.
    pub async fn claim(
        pool: &PgPool,
        id: DbId,
        expected_last_check_in: Option<Timestamp>,
        now: Timestamp,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE wills \
             SET is_triggered = TRUE, triggered_at = $3 \
             WHERE id = $1 AND is_active = TRUE AND is_triggered = FALSE \
               AND ($2::TIMESTAMPTZ IS NULL OR last_check_in = $2)",
        )
        .bind(id)
        .bind(expected_last_check_in)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Record an owner check-in, resetting the inactivity deadline.
    ///
    /// Rejected once the will has triggered (or was deactivated): returns
    /// `false` and leaves the row untouched.
    pub async fn check_in(pool: &PgPool, id: DbId, now: Timestamp) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE wills \
             SET last_check_in = $2 \
             WHERE id = $1 AND is_active = TRUE AND is_triggered = FALSE",
        )
        .bind(id)
        .bind(now)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
